//! JSON serialization types for compiled songs

use super::commands::DriverCommand;
use super::header::SongHeader;
use super::reader::BytecodeReader;
use crate::compiler::symbol::{Symbol, SymbolEntry};
use crate::compiler::CompiledSong;
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Top-level JSON structure for a compiled song
#[derive(Debug, Clone, Serialize)]
pub struct SongListing {
    /// Address of the song's first byte
    pub base: usize,
    /// Size in bytes
    pub size: usize,
    pub header: HeaderJson,
    /// Symbols by name
    pub symbols: BTreeMap<String, SymbolEntry>,
    /// Decoded event lists, in address order
    pub lists: Vec<EventListJson>,
}

/// JSON representation of the song header
#[derive(Debug, Clone, Serialize)]
pub struct HeaderJson {
    pub address: usize,
    /// Main event list address per driver channel
    pub channels: Vec<Option<u16>>,
    pub timer_a_counter: u16,
    pub time_base: u8,
    pub instruments: u16,
}

/// JSON representation of a decoded event list
#[derive(Debug, Clone, Serialize)]
pub struct EventListJson {
    pub symbol: Symbol,
    pub address: usize,
    pub commands: Vec<DriverCommand>,
}

impl SongListing {
    /// Describe a compiled song, decoding its event lists
    pub fn new(song: &CompiledSong) -> Result<Self> {
        let header = SongHeader::parse(&song.data, song.header_address - song.base)?;

        // Block boundaries; matrix rows point inside main lists
        let mut starts: Vec<usize> = song
            .symbols
            .iter()
            .filter(|(symbol, _)| !matches!(symbol, Symbol::MatrixRow { .. }))
            .map(|(_, entry)| entry.address)
            .collect();
        starts.sort_unstable();

        let mut lists = Vec::new();
        let mut reader = BytecodeReader::new(&song.data);
        for (symbol, entry) in song.symbols.iter() {
            if !matches!(symbol, Symbol::SubPattern { .. } | Symbol::EventList { .. }) {
                continue;
            }
            let end = starts
                .iter()
                .copied()
                .find(|&a| a > entry.address)
                .unwrap_or(song.end());
            let commands = reader.parse_list(entry.address - song.base, end - song.base)?;
            lists.push(EventListJson {
                symbol: *symbol,
                address: entry.address,
                commands,
            });
        }
        lists.sort_by_key(|list| list.address);

        Ok(Self {
            base: song.base,
            size: song.data.len(),
            header: HeaderJson {
                address: song.header_address,
                channels: header.channels.to_vec(),
                timer_a_counter: header.timer_a_counter,
                time_base: header.time_base,
                instruments: header.instruments,
            },
            symbols: song
                .symbols
                .iter()
                .map(|(symbol, entry)| (symbol.to_string(), entry.clone()))
                .collect(),
            lists,
        })
    }
}
