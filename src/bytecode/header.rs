//! Song header layout
//!
//! The header is placed after all of a song's event lists:
//! one 2-byte address per driver channel (0 when the channel is unused),
//! the timer A counter (2 bytes), the time base (1 byte) and the address
//! of the instrument table (2 bytes). All values are little-endian.

use super::reader::BytecodeReader;
use crate::compiler::CHANNEL_COUNT;
use crate::error::Result;

/// Header size in bytes
pub const SONG_HEADER_SIZE: usize = CHANNEL_COUNT * 2 + 5;

/// Parsed song header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongHeader {
    /// Main event list address per driver channel
    pub channels: [Option<u16>; CHANNEL_COUNT],
    pub timer_a_counter: u16,
    pub time_base: u8,
    pub instruments: u16,
}

impl SongHeader {
    /// Serialize the header
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(SONG_HEADER_SIZE);

        for address in &self.channels {
            let address = address.unwrap_or(0);
            data.push((address & 0xFF) as u8); // LSB
            data.push((address >> 8) as u8); // MSB
        }

        data.push((self.timer_a_counter & 0xFF) as u8);
        data.push((self.timer_a_counter >> 8) as u8);
        data.push(self.time_base);
        data.push((self.instruments & 0xFF) as u8);
        data.push((self.instruments >> 8) as u8);

        data
    }

    /// Parse a header at `offset` of `data`
    pub fn parse(data: &[u8], offset: usize) -> Result<Self> {
        let mut reader = BytecodeReader::new(data);
        reader.seek(offset);

        let mut header = Self::default();
        for channel in header.channels.iter_mut() {
            let address = reader.read_u16_le()?;
            *channel = (address != 0).then_some(address);
        }
        header.timer_a_counter = reader.read_u16_le()?;
        header.time_base = reader.read_u8()?;
        header.instruments = reader.read_u16_le()?;

        Ok(header)
    }
}
