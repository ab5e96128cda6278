//! Symbol table used while laying out a song

use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Named address binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// Auxiliary data block (macro tables, sample list)
    OtherData(usize),
    /// Start of the instrument table
    Instruments,
    /// Sub-pattern `index` of a driver channel
    SubPattern { channel: usize, index: usize },
    /// Main event list of a driver channel
    EventList { channel: usize },
    /// Jump to the sub-pattern of a pattern matrix row, inside a main event list
    MatrixRow { channel: usize, row: usize },
    /// Song header
    Header,
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::OtherData(i) => write!(f, "ODATA:{:02X}", i),
            Symbol::Instruments => write!(f, "INSTRUMENTS"),
            Symbol::SubPattern { channel, index } => {
                write!(f, "SUBEL:CH{:01X};{:02X}", channel, index)
            }
            Symbol::EventList { channel } => write!(f, "EL:{:02X}", channel),
            Symbol::MatrixRow { channel, row } => write!(f, "ROW:CH{:01X};{:03X}", channel, row),
            Symbol::Header => write!(f, "HEADER"),
        }
    }
}

impl Serialize for Symbol {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Definition address and the address of every operand referencing it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolEntry {
    pub address: usize,
    pub references: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: BTreeMap<Symbol, SymbolEntry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a symbol; a symbol can only be defined once
    pub fn define(&mut self, symbol: Symbol, address: usize) -> Result<()> {
        if self.entries.contains_key(&symbol) {
            return Err(Error::DuplicateSymbol(symbol));
        }
        self.entries.insert(
            symbol,
            SymbolEntry {
                address,
                references: Vec::new(),
            },
        );
        Ok(())
    }

    /// Record that `from` refers to `symbol` and return its address
    pub fn reference(&mut self, symbol: Symbol, from: usize) -> Result<usize> {
        let entry = self
            .entries
            .get_mut(&symbol)
            .ok_or(Error::UndefinedSymbol(symbol))?;
        entry.references.push(from);
        Ok(entry.address)
    }

    /// Address of a symbol
    pub fn address(&self, symbol: Symbol) -> Result<usize> {
        self.get(symbol)
            .map(|e| e.address)
            .ok_or(Error::UndefinedSymbol(symbol))
    }

    pub fn get(&self, symbol: Symbol) -> Option<&SymbolEntry> {
        self.entries.get(&symbol)
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.entries.contains_key(&symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &SymbolEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
