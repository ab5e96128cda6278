//! Tracker pattern to sub-pattern conversion

use super::event::{Command, EventList, Panning, SlideDirection};
use super::note::{note_to_driver, volume_to_driver};
use crate::error::{Error, Result};
use crate::tracker::{channel_kind, effect, ChannelKind, Pattern, Row, TimeInfo};

/// Map a tracker effect to its driver command
fn effect_command(code: u8, value: u8) -> Option<Command> {
    let command = match code {
        effect::PITCH_SLIDE_UP => Command::PitchSlide {
            direction: SlideDirection::Up,
            speed: value,
        },
        effect::PITCH_SLIDE_DOWN => Command::PitchSlide {
            direction: SlideDirection::Down,
            speed: value,
        },
        effect::PORTAMENTO => Command::Portamento { speed: value },
        effect::SET_PANNING => Command::SetPanning {
            panning: Panning::from_tracker(value),
        },
        effect::POSITION_JUMP => Command::PositionJump {
            row: value as usize,
        },
        _ => return None,
    };
    Some(command)
}

/// Converts the patterns of one tracker channel
#[derive(Debug, Clone)]
pub struct PatternConverter {
    channel: usize,
    kind: ChannelKind,
    time_info: TimeInfo,
    /// Set when an SSG note had to be clamped to the lowest octave
    pub notes_below_range: bool,
}

/// Running state while walking a pattern's rows
#[derive(Debug, Default)]
struct RowState {
    ticks_since_last_command: u32,
    instrument: Option<u8>,
    volume: Option<u8>,
    sample_bank: u8,
}

impl PatternConverter {
    pub fn new(channel: usize, time_info: TimeInfo) -> Self {
        Self {
            channel,
            kind: channel_kind(channel),
            time_info,
            notes_below_range: false,
        }
    }

    /// Ticks taken by a row; even and odd rows alternate between two lengths
    fn row_ticks(&self, row: usize) -> Result<u32> {
        let tick_time = if row % 2 == 0 {
            self.time_info.tick_time_1
        } else {
            self.time_info.tick_time_2
        };
        tick_time
            .checked_mul(self.time_info.time_base)
            .ok_or(Error::TickOverflow {
                channel: self.channel,
            })
    }

    /// Build the sub-pattern of a tracker pattern
    ///
    /// Each command carries the ticks waited after it: when a row produces
    /// commands, the accumulated ticks go to the previously emitted one.
    /// Rows whose values repeat the current state produce nothing and keep
    /// accumulating.
    pub fn convert(&mut self, pattern: &Pattern) -> Result<EventList> {
        let mut list = EventList::sub();
        list.push(Command::WaitTicks);

        let mut state = RowState::default();
        let mut ends_pattern = false;

        for (i, row) in pattern.rows.iter().enumerate() {
            if !row.is_empty() {
                let mut commands = Vec::new();
                ends_pattern = self.convert_row(row, &mut state, &mut commands)?;

                if !commands.is_empty() {
                    list.set_last_timing(state.ticks_since_last_command);
                    state.ticks_since_last_command = 0;
                    for command in commands {
                        list.push(command);
                    }
                }
            }

            state.ticks_since_last_command = state
                .ticks_since_last_command
                .checked_add(self.row_ticks(i)?)
                .ok_or(Error::TickOverflow {
                    channel: self.channel,
                })?;
            if ends_pattern {
                break;
            }
        }

        list.set_last_timing(state.ticks_since_last_command);

        // A position jump already leaves the sub-pattern
        if !ends_pattern {
            list.push(Command::ReturnFromSubPattern);
        }
        Ok(list)
    }

    /// Collect a row's commands, returns true if the row ends the pattern
    fn convert_row(
        &mut self,
        row: &Row,
        state: &mut RowState,
        list: &mut Vec<Command>,
    ) -> Result<bool> {
        // Bank switches apply to the note of the same row
        for fx in &row.effects {
            if fx.code == effect::SET_SAMPLES_BANK {
                if let Some(bank) = fx.value {
                    state.sample_bank = bank;
                }
            }
        }

        if row.is_note_off() {
            list.push(Command::NoteOff);
        }

        if let Some(volume) = row.volume {
            if state.volume != Some(volume) {
                state.volume = Some(volume);
                list.push(Command::SetChannelVolume {
                    volume: volume_to_driver(self.kind, volume),
                });
            }
        }

        // ADPCM-A channels always use the sample pseudo-instrument
        if let Some(instrument) = row.instrument {
            if state.instrument != Some(instrument) && self.kind != ChannelKind::AdpcmA {
                state.instrument = Some(instrument);
                list.push(Command::ChangeInstrument { instrument });
            }
        }

        if let (Some(note), Some(octave)) = (row.note, row.octave) {
            if !row.is_note_off() {
                let channel = self.channel;
                let out_of_range = move || Error::NoteOutOfRange {
                    channel,
                    note,
                    octave,
                };
                let converted =
                    note_to_driver(self.kind, note, octave).ok_or_else(out_of_range)?;
                self.notes_below_range |= converted.below_range;

                let mut value = converted.value;
                if self.kind == ChannelKind::AdpcmA {
                    value = state
                        .sample_bank
                        .checked_mul(12)
                        .and_then(|offset| value.checked_add(offset))
                        .ok_or_else(out_of_range)?;
                }
                list.push(Command::Note { note: value });
            }
        }

        let mut ends_pattern = false;
        for fx in &row.effects {
            if fx.code == effect::SET_SAMPLES_BANK {
                continue;
            }
            let Some(value) = fx.value else {
                continue;
            };
            let command = effect_command(fx.code, value).ok_or(Error::UnmappedEffect {
                channel: self.channel,
                code: fx.code,
                value,
            })?;
            list.push(command);
            if fx.code == effect::POSITION_JUMP {
                ends_pattern = true;
            }
        }

        Ok(ends_pattern)
    }
}
