use crate::compiler::symbol::Symbol;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported tick frequency: {0}Hz")]
    UnsupportedFrequency(f64),

    #[error("Timer A counter out of range: {0}")]
    TimerOverflow(f64),

    #[error("Too many instruments: {0} (maximum supported count is 254)")]
    TooManyInstruments(usize),

    #[error("Too many songs: {0} (maximum supported count is 255)")]
    TooManySongs(usize),

    #[error("Symbol '{0}' already exists")]
    DuplicateSymbol(Symbol),

    #[error("Symbol '{0}' doesn't exist")]
    UndefinedSymbol(Symbol),

    #[error("Position jump on channel {channel} targets missing matrix row {row}")]
    UnresolvedPositionJump { channel: usize, row: usize },

    #[error("Effect {code:02X}{value:02X} on channel {channel} has no driver equivalent")]
    UnmappedEffect { channel: usize, code: u8, value: u8 },

    #[error("Note {note} at octave {octave} on channel {channel} doesn't fit in a driver note")]
    NoteOutOfRange { channel: usize, note: u8, octave: u8 },

    #[error("Tick count overflow on channel {channel}")]
    TickOverflow { channel: usize },

    #[error("Pattern {pattern:02X} of channel {channel} is missing")]
    MissingPattern { channel: usize, pattern: u8 },

    #[error("Compiled sound data overflow: {size} bytes (maximum is {max})")]
    SoundDataOverflow { size: usize, max: usize },

    #[error("Bytecode decode error: {0}")]
    Decode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
