//! Driver instruments and the auxiliary data they refer to

use super::symbol::{Symbol, SymbolTable};
use crate::error::Result;
use crate::tracker::{FmInstrument, Instrument, MacroDef, SsgInstrument};

/// Size of every instrument record
pub const INSTRUMENT_SIZE: usize = 32;

/// Instruments a module may define; the last driver slot is the ADPCM-A one
pub const MAX_INSTRUMENTS: usize = 254;

/// Macro loop point value meaning "no loop"
pub const MACRO_NO_LOOP: u8 = 0xFF;

/// Auxiliary table placed ahead of the instruments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtherData {
    /// Per-tick value table of an instrument
    Macro { values: Vec<u8>, loop_point: Option<u8> },
    /// Start and end V-ROM address (in 256-byte units) of every sample
    SampleList(Vec<(usize, usize)>),
}

impl OtherData {
    pub fn from_macro(def: &MacroDef) -> Self {
        OtherData::Macro {
            values: def.values.iter().take(0xFF).copied().collect(),
            loop_point: def.loop_point,
        }
    }

    pub fn compile(&self) -> Vec<u8> {
        match self {
            OtherData::Macro { values, loop_point } => {
                let mut data = Vec::with_capacity(values.len() + 2);
                data.push(values.len() as u8);
                data.push(loop_point.unwrap_or(MACRO_NO_LOOP));
                data.extend(values);
                data
            }
            OtherData::SampleList(addresses) => {
                let mut data = Vec::with_capacity(addresses.len() * 4 + 1);
                data.push(addresses.len() as u8);
                for &(start, end) in addresses {
                    push_u16(&mut data, start);
                    push_u16(&mut data, end);
                }
                data
            }
        }
    }
}

/// Instrument as stored in the driver's instrument table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverInstrument {
    Fm(FmInstrument),
    Ssg {
        tone: bool,
        noise: bool,
        /// Other data indices of the volume, arpeggio and mixing macros
        macros: [Option<usize>; 3],
    },
    /// Pseudo-instrument used by every ADPCM-A channel
    AdpcmA { sample_list: usize },
}

impl DriverInstrument {
    /// Convert a tracker instrument, appending its macros to `other_data`
    pub fn from_tracker(instrument: &Instrument, other_data: &mut Vec<OtherData>) -> Self {
        match instrument {
            Instrument::Fm(fm) => DriverInstrument::Fm(fm.clone()),
            Instrument::Ssg(ssg) => Self::from_ssg(ssg, other_data),
        }
    }

    fn from_ssg(ssg: &SsgInstrument, other_data: &mut Vec<OtherData>) -> Self {
        let mut macros = [None; 3];
        let defs = [&ssg.volume_macro, &ssg.arpeggio_macro, &ssg.mixing_macro];

        for (slot, def) in macros.iter_mut().zip(defs) {
            if let Some(def) = def {
                *slot = Some(other_data.len());
                other_data.push(OtherData::from_macro(def));
            }
        }

        DriverInstrument::Ssg {
            tone: ssg.tone,
            noise: ssg.noise,
            macros,
        }
    }

    /// Compile the instrument record placed at `address`
    pub fn compile(&self, symbols: &mut SymbolTable, address: usize) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(INSTRUMENT_SIZE);

        match self {
            DriverInstrument::Fm(fm) => {
                data.push((fm.feedback & 7) << 3 | (fm.algorithm & 7));
                data.push((fm.ams & 3) << 4 | (fm.fms & 7));
                for op in &fm.operators {
                    data.push((op.dt & 7) << 4 | (op.mul & 0x0F));
                    data.push(op.tl & 0x7F);
                    data.push((op.ks & 3) << 6 | (op.ar & 0x1F));
                    data.push((op.am & 1) << 7 | (op.dr & 0x1F));
                    data.push(op.sr & 0x1F);
                    data.push((op.sl & 0x0F) << 4 | (op.rr & 0x0F));
                    data.push(op.ssg_eg & 0x0F);
                }
            }
            DriverInstrument::Ssg { tone, noise, macros } => {
                data.push(*tone as u8 | (*noise as u8) << 1);
                for index in macros {
                    let macro_address = match index {
                        Some(index) => {
                            symbols.reference(Symbol::OtherData(*index), address + data.len())?
                        }
                        None => 0,
                    };
                    push_u16(&mut data, macro_address);
                }
            }
            DriverInstrument::AdpcmA { sample_list } => {
                let list_address = symbols.reference(Symbol::OtherData(*sample_list), address)?;
                push_u16(&mut data, list_address);
            }
        }

        data.resize(INSTRUMENT_SIZE, 0);
        Ok(data)
    }
}

fn push_u16(data: &mut Vec<u8>, value: usize) {
    data.push((value & 0xFF) as u8);
    data.push(((value >> 8) & 0xFF) as u8);
}
