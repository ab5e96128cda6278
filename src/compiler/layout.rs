//! Song layout
//!
//! Blocks are placed in a single sequential pass: other data, instruments,
//! then for every driver channel its sub-patterns followed by its main list,
//! and finally the header. Position jumps inside sub-patterns target rows of
//! the main list, which is placed later; their address bytes are patched
//! in the output as soon as the target row is placed.

use super::event::{Command, EmitContext, EventList};
use super::symbol::{Symbol, SymbolTable};
use super::{Song, ADDRESS_SPACE, CHANNEL_COUNT, SOUND_DATA_MAX_SIZE};
use crate::bytecode::header::SongHeader;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Address bytes of a position jump waiting for its target row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct JumpSite {
    channel: usize,
    row: usize,
    /// Ordinal of the jump among the song's position jumps
    site: usize,
}

/// Result of compiling a song
#[derive(Debug, Clone)]
pub struct CompiledSong {
    /// Address of the first byte of `data`
    pub base: usize,
    pub data: Vec<u8>,
    /// Address of the song header (the song's entry point)
    pub header_address: usize,
    pub symbols: SymbolTable,
}

impl CompiledSong {
    /// Address just after the song
    pub fn end(&self) -> usize {
        self.base + self.data.len()
    }
}

/// Compilation context of a single song
struct Layout<'a> {
    song: &'a Song,
    base: usize,
    out: Vec<u8>,
    symbols: SymbolTable,
    jump_sites: BTreeMap<JumpSite, usize>,
    jump_count: usize,
}

impl<'a> Layout<'a> {
    fn new(song: &'a Song, base: usize) -> Self {
        Self {
            song,
            base,
            out: Vec::new(),
            symbols: SymbolTable::new(),
            jump_sites: BTreeMap::new(),
            jump_count: 0,
        }
    }

    /// Address of the next emitted byte
    fn address(&self) -> usize {
        self.base + self.out.len()
    }

    fn define(&mut self, symbol: Symbol) -> Result<()> {
        self.symbols.define(symbol, self.address())
    }

    fn place_other_data(&mut self) -> Result<()> {
        let song = self.song;
        for (i, data) in song.other_data.iter().enumerate() {
            self.define(Symbol::OtherData(i))?;
            let bytes = data.compile();
            debug!("{} at {:#06X}, {} bytes", Symbol::OtherData(i), self.address(), bytes.len());
            self.out.extend(bytes);
        }
        Ok(())
    }

    fn place_instruments(&mut self) -> Result<()> {
        self.define(Symbol::Instruments)?;
        let start = self.address();

        let song = self.song;
        for instrument in &song.instruments {
            let address = self.address();
            let bytes = instrument.compile(&mut self.symbols, address)?;
            self.out.extend(bytes);
        }

        debug!("{} at {:#06X}, {} bytes", Symbol::Instruments, start, self.address() - start);
        Ok(())
    }

    /// Emit an event list, recording matrix rows and pending jump sites
    fn place_list(&mut self, channel: usize, index: usize, list: &EventList) -> Result<()> {
        let symbol = list.symbol(channel, index);
        self.define(symbol)?;
        let start = self.address();

        let mut row = 0;
        for event in list.iter() {
            if let Command::JumpToSubPattern { .. } = event.command {
                self.define_row(channel, row)?;
                row += 1;
            }

            let address = self.address();
            let mut ctx = EmitContext {
                channel,
                address,
                symbols: &mut self.symbols,
            };
            let bytes = event.compile(&mut ctx)?;

            if let Command::PositionJump { row: target } = event.command {
                if !self.symbols.contains(Symbol::MatrixRow { channel, row: target }) {
                    let key = JumpSite {
                        channel,
                        row: target,
                        site: self.jump_count,
                    };
                    self.jump_count += 1;
                    // The jump address is always in the last two bytes
                    self.jump_sites.insert(key, address + bytes.len() - 2);
                }
            }

            self.out.extend(bytes);
        }

        debug!("{} at {:#06X}, {} bytes", symbol, start, self.address() - start);
        Ok(())
    }

    /// Define a matrix row of the main list and patch the jumps targeting it
    fn define_row(&mut self, channel: usize, row: usize) -> Result<()> {
        let symbol = Symbol::MatrixRow { channel, row };
        let address = self.address();
        self.symbols.define(symbol, address)?;

        let first = JumpSite {
            channel,
            row,
            site: 0,
        };
        let last = JumpSite {
            site: usize::MAX,
            ..first
        };
        let sites: Vec<_> = self.jump_sites.range(first..=last).map(|(k, v)| (*k, *v)).collect();

        for (key, site_address) in sites {
            self.symbols.reference(symbol, site_address)?;
            let offset = site_address - self.base;
            self.out[offset] = (address & 0xFF) as u8; // LSB
            self.out[offset + 1] = (address >> 8) as u8; // MSB
            self.jump_sites.remove(&key);
        }
        Ok(())
    }

    fn place_channels(&mut self) -> Result<()> {
        let song = self.song;
        for (channel, data) in song.channels.iter().enumerate() {
            let Some(data) = data else {
                continue;
            };
            for (i, sub_pattern) in data.sub_patterns.iter().enumerate() {
                self.place_list(channel, i, sub_pattern)?;
            }
            self.place_list(channel, 0, &data.events)?;
        }

        match self.jump_sites.keys().next() {
            Some(site) => Err(Error::UnresolvedPositionJump {
                channel: site.channel,
                row: site.row,
            }),
            None => Ok(()),
        }
    }

    fn place_header(&mut self) -> Result<usize> {
        self.define(Symbol::Header)?;
        let address = self.address();

        let mut header = SongHeader {
            timer_a_counter: self.song.timer.counter,
            time_base: self.song.timer.time_base,
            ..SongHeader::default()
        };
        for channel in 0..CHANNEL_COUNT {
            if self.song.channels[channel].is_some() {
                let list = self
                    .symbols
                    .reference(Symbol::EventList { channel }, address + channel * 2)?;
                header.channels[channel] = Some(list as u16);
            }
        }
        header.instruments = self
            .symbols
            .reference(Symbol::Instruments, address + CHANNEL_COUNT * 2 + 3)? as u16;

        self.out.extend(header.to_bytes());
        debug!("{} at {:#06X}", Symbol::Header, address);
        Ok(address)
    }
}

impl Song {
    /// Compile the song at address `base` within the default size budget
    pub fn compile(&self, base: usize) -> Result<CompiledSong> {
        self.compile_with_limit(base, SOUND_DATA_MAX_SIZE)
    }

    /// Compile the song at address `base`; the song must end at or before `max_size`
    ///
    /// A song ending exactly at `max_size` is accepted, so `max_size` is the
    /// number of usable bytes rather than the first forbidden size. Budgets
    /// past `ADDRESS_SPACE` are capped to it since every address the driver
    /// reads is 16-bit.
    pub fn compile_with_limit(&self, base: usize, max_size: usize) -> Result<CompiledSong> {
        let max_size = max_size.min(ADDRESS_SPACE);
        let mut layout = Layout::new(self, base);

        layout.place_other_data()?;
        layout.place_instruments()?;
        layout.place_channels()?;
        let header_address = layout.place_header()?;

        let end = layout.address();
        if end > max_size {
            return Err(Error::SoundDataOverflow {
                size: end,
                max: max_size,
            });
        }

        info!(
            "Song compiled at {:#06X}: {} bytes, header at {:#06X}",
            base,
            layout.out.len(),
            header_address
        );

        Ok(CompiledSong {
            base,
            data: layout.out,
            header_address,
            symbols: layout.symbols,
        })
    }
}
