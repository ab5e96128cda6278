//! Driver wait command generation

use super::commands::opcode;

/// Encode a delay of `ticks` with the largest wait commands first
///
/// A wait word subtracts 0xFFFF from the remaining ticks even though it only
/// carries the low 16 bits, a wait byte subtracts 0x100 and a wait nibble 0x10.
pub fn encode_wait(ticks: i64) -> Vec<u8> {
    let mut commands = Vec::new();
    push_wait(&mut commands, ticks);
    commands
}

/// Append the wait commands for `ticks` to `out`
pub fn push_wait(out: &mut Vec<u8>, mut ticks: i64) {
    while ticks > 0 {
        if ticks > 0x100 {
            out.push(opcode::WAIT_WORD);
            out.push((ticks & 0xFF) as u8);
            out.push(((ticks >> 8) & 0xFF) as u8);
            ticks -= 0xFFFF;
        } else if ticks > 0x10 {
            out.push(opcode::WAIT_BYTE);
            out.push(((ticks - 1) & 0xFF) as u8);
            ticks -= 0x100;
        } else {
            out.push(opcode::WAIT_NIBBLE_BASE | ((ticks - 1) & 0x0F) as u8);
            ticks -= 0x10;
        }
    }
}
