//! Driver command definitions

use serde::Serialize;

/// Driver opcodes
pub mod opcode {
    pub const END_OF_EVENT_LIST: u8 = 0x00;
    pub const NOTE_OFF: u8 = 0x01;
    pub const CHANGE_INSTRUMENT: u8 = 0x02;
    pub const WAIT_BYTE: u8 = 0x03;
    pub const WAIT_WORD: u8 = 0x04;
    pub const SET_CHANNEL_VOLUME: u8 = 0x05;
    pub const SET_PANNING: u8 = 0x06;
    pub const PORT_WRITE_A: u8 = 0x07;
    pub const PORT_WRITE_B: u8 = 0x08;
    pub const SET_TIMER_A: u8 = 0x09;
    pub const POSITION_JUMP: u8 = 0x0A;
    pub const POSITION_JUMP_SHORT: u8 = 0x0B;
    pub const PITCH_SLIDE_UP: u8 = 0x0C;
    pub const PITCH_SLIDE_DOWN: u8 = 0x0D;
    pub const PORTAMENTO: u8 = 0x0E;
    /// Wait n+1 ticks (n = 0-15, command 0x10-0x1F)
    pub const WAIT_NIBBLE_BASE: u8 = 0x10;
    pub const RETURN_FROM_SUB_PATTERN: u8 = 0x20;
    pub const JUMP_TO_SUB_PATTERN: u8 = 0x21;
    /// Note with up to 127 ticks of wait in the low bits (0x80-0xFF)
    pub const NOTE_BASE: u8 = 0x80;
}

/// A decoded driver command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DriverCommand {
    /// End of a channel's main event list
    EndOfEventList,
    /// Note with folded wait
    Note { note: u8, ticks: u8 },
    /// Note off with folded wait
    NoteOff { ticks: u8 },
    ChangeInstrument { instrument: u8 },
    /// Wait N ticks (nibble, byte or word form)
    Wait { ticks: u32 },
    SetChannelVolume { volume: u8 },
    SetPanning { panning: u8 },
    PortWriteA { address: u8, data: u8 },
    PortWriteB { address: u8, data: u8 },
    SetTimerA { counter: u16 },
    /// Jump to an absolute address
    PositionJump { address: u16 },
    /// Jump relative to the opcode's address
    PositionJumpShort { offset: i8 },
    PitchSlideUp { speed: u8 },
    PitchSlideDown { speed: u8 },
    Portamento { speed: u8 },
    ReturnFromSubPattern,
    JumpToSubPattern { address: u16 },
    /// Unknown command
    Unknown { opcode: u8 },
}

impl DriverCommand {
    /// Get wait ticks if this is a wait command
    pub fn wait_ticks(&self) -> Option<u32> {
        match self {
            DriverCommand::Wait { ticks } => Some(*ticks),
            _ => None,
        }
    }

    /// Check if the driver stops reading the list after this command
    pub fn ends_list(&self) -> bool {
        matches!(
            self,
            DriverCommand::EndOfEventList
                | DriverCommand::ReturnFromSubPattern
                | DriverCommand::PositionJump { .. }
                | DriverCommand::PositionJumpShort { .. }
        )
    }
}

/// Get the number of bytes to read after the opcode for a command
pub fn command_size(op: u8) -> usize {
    match op {
        opcode::END_OF_EVENT_LIST | opcode::RETURN_FROM_SUB_PATTERN => 0,
        opcode::WAIT_NIBBLE_BASE..=0x1F => 0,
        opcode::NOTE_OFF
        | opcode::CHANGE_INSTRUMENT
        | opcode::WAIT_BYTE
        | opcode::SET_CHANNEL_VOLUME
        | opcode::SET_PANNING
        | opcode::POSITION_JUMP_SHORT
        | opcode::PITCH_SLIDE_UP
        | opcode::PITCH_SLIDE_DOWN
        | opcode::PORTAMENTO => 1,
        opcode::NOTE_BASE..=0xFF => 1,
        opcode::WAIT_WORD
        | opcode::PORT_WRITE_A
        | opcode::PORT_WRITE_B
        | opcode::SET_TIMER_A
        | opcode::POSITION_JUMP
        | opcode::JUMP_TO_SUB_PATTERN => 2,
        // Reserved/unknown
        _ => 0,
    }
}
