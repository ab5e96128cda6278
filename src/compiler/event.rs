//! Song events and their bytecode

use super::symbol::{Symbol, SymbolTable};
use super::timer::timer_a_counter;
use crate::bytecode::commands::opcode;
use crate::bytecode::wait::push_wait;
use crate::error::Result;

/// ADPCM-A master panning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panning {
    None = 0x00,
    Right = 0x40,
    Left = 0x80,
    Center = 0xC0,
}

impl Panning {
    /// Tracker panning: left speaker in the high nibble, right in the low one
    pub fn from_tracker(value: u8) -> Self {
        match (value & 0xF0 != 0, value & 0x0F != 0) {
            (false, false) => Panning::None,
            (false, true) => Panning::Right,
            (true, false) => Panning::Left,
            (true, true) => Panning::Center,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    Up,
    Down,
}

/// Driver command carried by a song event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Pure delay, used as the first event of a sub-pattern
    WaitTicks,
    /// Note on (a sample index on ADPCM-A channels)
    Note { note: u8 },
    NoteOff,
    ChangeInstrument { instrument: u8 },
    SetChannelVolume { volume: u8 },
    SetPanning { panning: Panning },
    /// Jump to a sub-pattern of the same channel, returning afterwards
    JumpToSubPattern { sub_pattern: usize },
    /// Continue playback at a pattern matrix row
    PositionJump { row: usize },
    PitchSlide { direction: SlideDirection, speed: u8 },
    Portamento { speed: u8 },
    PortWriteA { address: u8, data: u8 },
    PortWriteB { address: u8, data: u8 },
    SetTimerAFrequency { counter: u16 },
    EndOfEventList,
    ReturnFromSubPattern,
}

impl Command {
    /// Timer A frequency change, from a tick rate in Hz
    pub fn set_timer_a_frequency(hz: f64) -> Result<Self> {
        Ok(Command::SetTimerAFrequency {
            counter: timer_a_counter(hz)?,
        })
    }
}

/// Command plus the ticks the driver waits after it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongEvent {
    pub timing: u32,
    pub command: Command,
}

/// Where an event is emitted
pub struct EmitContext<'a> {
    /// Driver channel
    pub channel: usize,
    /// Address of the event's first byte
    pub address: usize,
    pub symbols: &'a mut SymbolTable,
}

impl SongEvent {
    pub fn new(command: Command) -> Self {
        Self { timing: 0, command }
    }

    pub fn with_timing(command: Command, timing: u32) -> Self {
        Self { timing, command }
    }

    /// Compile the event to driver bytecode
    pub fn compile(&self, ctx: &mut EmitContext) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        let timing = self.timing as i64;

        match self.command {
            Command::WaitTicks => push_wait(&mut data, timing),
            Command::Note { note } => {
                data.push(opcode::NOTE_BASE | (timing & 0x7F) as u8);
                data.push(note);
                push_wait(&mut data, timing - 0x7F);
            }
            Command::NoteOff => {
                data.push(opcode::NOTE_OFF);
                data.push((timing & 0xFF) as u8);
                push_wait(&mut data, timing - 0xFF);
            }
            Command::ChangeInstrument { instrument } => {
                data.extend([opcode::CHANGE_INSTRUMENT, instrument]);
                push_wait(&mut data, timing);
            }
            Command::SetChannelVolume { volume } => {
                data.extend([opcode::SET_CHANNEL_VOLUME, volume]);
                push_wait(&mut data, timing);
            }
            Command::SetPanning { panning } => {
                data.extend([opcode::SET_PANNING, panning as u8]);
                push_wait(&mut data, timing);
            }
            Command::PitchSlide { direction, speed } => {
                let op = match direction {
                    SlideDirection::Up => opcode::PITCH_SLIDE_UP,
                    SlideDirection::Down => opcode::PITCH_SLIDE_DOWN,
                };
                data.extend([op, speed]);
                push_wait(&mut data, timing);
            }
            Command::Portamento { speed } => {
                data.extend([opcode::PORTAMENTO, speed]);
                push_wait(&mut data, timing);
            }
            Command::PortWriteA { address, data: value } => {
                data.extend([opcode::PORT_WRITE_A, address, value]);
                push_wait(&mut data, timing);
            }
            Command::PortWriteB { address, data: value } => {
                data.extend([opcode::PORT_WRITE_B, address, value]);
                push_wait(&mut data, timing);
            }
            Command::SetTimerAFrequency { counter } => {
                data.push(opcode::SET_TIMER_A);
                push_u16(&mut data, counter as usize);
                push_wait(&mut data, timing);
            }
            Command::JumpToSubPattern { sub_pattern } => {
                push_wait(&mut data, timing);
                let symbol = Symbol::SubPattern {
                    channel: ctx.channel,
                    index: sub_pattern,
                };
                // The reference is the address operand, after the opcode
                let target = ctx.symbols.reference(symbol, ctx.address + data.len() + 1)?;
                data.push(opcode::JUMP_TO_SUB_PATTERN);
                push_u16(&mut data, target);
            }
            Command::PositionJump { row } => {
                push_wait(&mut data, timing);
                let symbol = Symbol::MatrixRow {
                    channel: ctx.channel,
                    row,
                };
                let at = ctx.address + data.len();
                let known_target = ctx.symbols.get(symbol).map(|e| e.address);
                match known_target {
                    Some(target) => {
                        ctx.symbols.reference(symbol, at + 1)?;
                        match i8::try_from(target as i64 - at as i64) {
                            Ok(offset) => data.extend([opcode::POSITION_JUMP_SHORT, offset as u8]),
                            Err(_) => {
                                data.push(opcode::POSITION_JUMP);
                                push_u16(&mut data, target);
                            }
                        }
                    }
                    None => {
                        // Patched once the target row is placed
                        data.extend([opcode::POSITION_JUMP, 0x00, 0x00]);
                    }
                }
            }
            Command::EndOfEventList => {
                push_wait(&mut data, timing);
                data.push(opcode::END_OF_EVENT_LIST);
            }
            Command::ReturnFromSubPattern => {
                push_wait(&mut data, timing);
                data.push(opcode::RETURN_FROM_SUB_PATTERN);
            }
        }

        Ok(data)
    }
}

fn push_u16(data: &mut Vec<u8>, value: usize) {
    data.push((value & 0xFF) as u8); // LSB
    data.push(((value >> 8) & 0xFF) as u8); // MSB
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Channel-level list of sub-pattern jumps
    Main,
    /// Sub-pattern holding the events of one tracker pattern
    Sub,
}

/// Ordered events of a channel's main list or of a sub-pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventList {
    pub events: Vec<SongEvent>,
    kind: ListKind,
}

impl EventList {
    pub fn new(kind: ListKind) -> Self {
        Self {
            events: Vec::new(),
            kind,
        }
    }

    pub fn main() -> Self {
        Self::new(ListKind::Main)
    }

    pub fn sub() -> Self {
        Self::new(ListKind::Sub)
    }

    pub fn is_sub(&self) -> bool {
        self.kind == ListKind::Sub
    }

    /// Symbol naming the list's address (`index` only matters for sub-patterns)
    pub fn symbol(&self, channel: usize, index: usize) -> Symbol {
        match self.kind {
            ListKind::Main => Symbol::EventList { channel },
            ListKind::Sub => Symbol::SubPattern { channel, index },
        }
    }

    /// Append a command with no wait
    pub fn push(&mut self, command: Command) {
        self.events.push(SongEvent::new(command));
    }

    /// Set the wait of the most recently appended event
    pub fn set_last_timing(&mut self, ticks: u32) {
        if let Some(event) = self.events.last_mut() {
            event.timing = ticks;
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SongEvent> {
        self.events.iter()
    }
}
