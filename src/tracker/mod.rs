//! In-memory tracker module model
//!
//! This is the structure handed over by the module parser. It is plain data,
//! deserializable from JSON so the command line tools can consume it.

pub mod instrument;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

pub use instrument::{FmInstrument, FmOperator, Instrument, MacroDef, Sample, SsgInstrument};

/// Number of channels in the tracker module (4 FM + 3 SSG + 6 ADPCM-A)
pub const SYSTEM_TOTAL_CHANNELS: usize = 13;

/// Note value used by the tracker for note-off
pub const NOTE_OFF: u8 = 100;

/// Effect codes with a special meaning in the tracker
pub mod effect {
    pub const PITCH_SLIDE_UP: u8 = 0x01;
    pub const PITCH_SLIDE_DOWN: u8 = 0x02;
    pub const PORTAMENTO: u8 = 0x03;
    pub const SET_PANNING: u8 = 0x08;
    pub const POSITION_JUMP: u8 = 0x0B;
    pub const SET_SAMPLES_BANK: u8 = 0xEB;
}

/// Sound hardware behind a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    AdpcmA,
    Fm,
    Ssg,
}

/// Get the kind of a tracker channel (FM 0-3, SSG 4-6, ADPCM-A 7-12)
pub fn channel_kind(channel: usize) -> ChannelKind {
    match channel {
        0..=3 => ChannelKind::Fm,
        4..=6 => ChannelKind::Ssg,
        _ => ChannelKind::AdpcmA,
    }
}

/// Song timing as defined by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeInfo {
    /// Tick frequency in Hz
    pub hz_value: f64,
    /// Tick length of even rows
    pub tick_time_1: u32,
    /// Tick length of odd rows
    pub tick_time_2: u32,
    /// Tracker time base
    pub time_base: u32,
}

impl Default for TimeInfo {
    fn default() -> Self {
        Self {
            hz_value: 60.0,
            tick_time_1: 6,
            tick_time_2: 6,
            time_base: 1,
        }
    }
}

/// Pattern matrix: for every channel, the pattern played at each row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternMatrix {
    /// `matrix[channel][row]`, `None` for channels without data
    pub matrix: Vec<Option<Vec<u8>>>,
}

impl PatternMatrix {
    /// Number of rows of the longest channel column
    pub fn rows(&self) -> usize {
        self.matrix
            .iter()
            .flatten()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }
}

/// Effect column entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub code: u8,
    #[serde(default)]
    pub value: Option<u8>,
}

impl Effect {
    pub fn new(code: u8, value: u8) -> Self {
        Self {
            code,
            value: Some(value),
        }
    }
}

/// Pattern row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Row {
    /// 1-12 (C# to C), or `NOTE_OFF`
    pub note: Option<u8>,
    pub octave: Option<u8>,
    pub volume: Option<u8>,
    pub instrument: Option<u8>,
    pub effects: Vec<Effect>,
}

impl Row {
    /// A row with only a note
    pub fn note(note: u8, octave: u8) -> Self {
        Self {
            note: Some(note),
            octave: Some(octave),
            ..Self::default()
        }
    }

    pub fn is_note_off(&self) -> bool {
        self.note == Some(NOTE_OFF)
    }

    /// Rows without note, volume, instrument and valued effects are empty
    pub fn is_empty(&self) -> bool {
        self.note.is_none()
            && self.volume.is_none()
            && self.instrument.is_none()
            && self.effects.iter().all(|e| e.value.is_none())
    }
}

/// Pattern of a single channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub rows: Vec<Row>,
}

impl Pattern {
    /// Pattern of `len` empty rows
    pub fn empty(len: usize) -> Self {
        Self {
            rows: vec![Row::default(); len],
        }
    }
}

/// Parsed tracker module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Module {
    pub time_info: TimeInfo,
    pub pattern_matrix: PatternMatrix,
    /// `patterns[channel][pattern]`
    pub patterns: Vec<Vec<Pattern>>,
    pub instruments: Vec<Instrument>,
    pub samples: Vec<Sample>,
}

impl Module {
    /// Load a module from its JSON representation
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a module from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Io(io::Error::new(
                e.kind(),
                format!("Failed to open '{}': {}", path.display(), e),
            ))
        })?;
        Self::from_json(&text)
    }

    /// Get a pattern of a channel
    pub fn pattern(&self, channel: usize, pattern: u8) -> Option<&Pattern> {
        self.patterns.get(channel)?.get(pattern as usize)
    }
}
