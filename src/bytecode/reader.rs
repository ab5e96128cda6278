//! Driver bytecode reader

use super::commands::{opcode, DriverCommand};
use crate::error::{Error, Result};

/// Bytecode reader over a compiled image
pub struct BytecodeReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BytecodeReader<'a> {
    /// Create a new reader from raw bytecode
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Check if at end of data
    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Get current position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Seek to position
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Read a byte
    pub fn read_u8(&mut self) -> Result<u8> {
        let value = *self
            .data
            .get(self.pos)
            .ok_or_else(|| Error::Decode(format!("unexpected end of data at {:#06X}", self.pos)))?;
        self.pos += 1;
        Ok(value)
    }

    /// Read a 16-bit little-endian value
    pub fn read_u16_le(&mut self) -> Result<u16> {
        let lo = self.read_u8()? as u16;
        let hi = self.read_u8()? as u16;
        Ok(lo | (hi << 8))
    }

    /// Parse every command until the end of the data
    pub fn parse_all(&mut self) -> Result<Vec<DriverCommand>> {
        let mut commands = Vec::new();
        while !self.is_eof() {
            commands.push(self.parse_command()?);
        }
        Ok(commands)
    }

    /// Parse commands in `start..end`, stopping early after a list terminator
    pub fn parse_list(&mut self, start: usize, end: usize) -> Result<Vec<DriverCommand>> {
        self.seek(start);

        let mut commands = Vec::new();
        while self.pos < end && !self.is_eof() {
            let cmd = self.parse_command()?;
            let is_end = cmd.ends_list();
            commands.push(cmd);
            if is_end {
                break;
            }
        }

        Ok(commands)
    }

    /// Parse a single command
    pub fn parse_command(&mut self) -> Result<DriverCommand> {
        let op = self.read_u8()?;

        let cmd = match op {
            opcode::END_OF_EVENT_LIST => DriverCommand::EndOfEventList,
            opcode::NOTE_OFF => DriverCommand::NoteOff {
                ticks: self.read_u8()?,
            },
            opcode::CHANGE_INSTRUMENT => DriverCommand::ChangeInstrument {
                instrument: self.read_u8()?,
            },
            opcode::WAIT_BYTE => DriverCommand::Wait {
                ticks: self.read_u8()? as u32 + 1,
            },
            opcode::WAIT_WORD => DriverCommand::Wait {
                ticks: self.read_u16_le()? as u32,
            },
            opcode::SET_CHANNEL_VOLUME => DriverCommand::SetChannelVolume {
                volume: self.read_u8()?,
            },
            opcode::SET_PANNING => DriverCommand::SetPanning {
                panning: self.read_u8()?,
            },
            opcode::PORT_WRITE_A => {
                let address = self.read_u8()?;
                let data = self.read_u8()?;
                DriverCommand::PortWriteA { address, data }
            }
            opcode::PORT_WRITE_B => {
                let address = self.read_u8()?;
                let data = self.read_u8()?;
                DriverCommand::PortWriteB { address, data }
            }
            opcode::SET_TIMER_A => DriverCommand::SetTimerA {
                counter: self.read_u16_le()?,
            },
            opcode::POSITION_JUMP => DriverCommand::PositionJump {
                address: self.read_u16_le()?,
            },
            opcode::POSITION_JUMP_SHORT => DriverCommand::PositionJumpShort {
                offset: self.read_u8()? as i8,
            },
            opcode::PITCH_SLIDE_UP => DriverCommand::PitchSlideUp {
                speed: self.read_u8()?,
            },
            opcode::PITCH_SLIDE_DOWN => DriverCommand::PitchSlideDown {
                speed: self.read_u8()?,
            },
            opcode::PORTAMENTO => DriverCommand::Portamento {
                speed: self.read_u8()?,
            },
            opcode::WAIT_NIBBLE_BASE..=0x1F => DriverCommand::Wait {
                ticks: (op & 0x0F) as u32 + 1,
            },
            opcode::RETURN_FROM_SUB_PATTERN => DriverCommand::ReturnFromSubPattern,
            opcode::JUMP_TO_SUB_PATTERN => DriverCommand::JumpToSubPattern {
                address: self.read_u16_le()?,
            },
            opcode::NOTE_BASE..=0xFF => DriverCommand::Note {
                ticks: op & 0x7F,
                note: self.read_u8()?,
            },
            _ => DriverCommand::Unknown { opcode: op },
        };

        Ok(cmd)
    }
}
