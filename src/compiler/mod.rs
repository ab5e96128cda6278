//! Song compiler - turns tracker modules into driver bytecode
//!
//! A song is assembled from a module first (event lists, sub-patterns,
//! instruments), then laid out in a single pass by `layout`.

pub mod event;
pub mod instrument;
pub mod layout;
pub mod note;
pub mod pattern;
pub mod sample;
pub mod sound_data;
pub mod symbol;
pub mod timer;

use crate::error::{Error, Result};
use crate::tracker::{channel_kind, ChannelKind, Module, SYSTEM_TOTAL_CHANNELS};
use event::{Command, EventList};
use instrument::{DriverInstrument, OtherData, MAX_INSTRUMENTS};
use pattern::PatternConverter;
use sample::{place_samples, PlacedSample};
use std::collections::BTreeSet;
use timer::{frequency_to_timer, TimerConfig};
use tracing::{debug, warn};

pub use layout::CompiledSong;

/// Number of driver channels
pub const CHANNEL_COUNT: usize = SYSTEM_TOTAL_CHANNELS;

/// Maximum size of the sound data (M1 ROM space left by the driver)
pub const SOUND_DATA_MAX_SIZE: usize = 30 * 1024;

/// Driver addresses are 16-bit; no byte can be placed at or past this address
pub const ADDRESS_SPACE: usize = 0x10000;

/// Driver channel of each tracker channel
///
/// The tracker orders channels FM, SSG, ADPCM-A; the driver orders them
/// ADPCM-A, FM, SSG.
pub const CHANNEL_ORDER: [usize; CHANNEL_COUNT] = [
    6, 7, 8, 9, // FM channels
    10, 11, 12, // SSG channels
    0, 1, 2, 3, 4, 5, // ADPCM-A channels
];

/// Tracker channel of each driver channel (inverse of `CHANNEL_ORDER`)
pub const TRACKER_CHANNEL: [usize; CHANNEL_COUNT] = [7, 8, 9, 10, 11, 12, 0, 1, 2, 3, 4, 5, 6];

/// Move per-channel data from tracker to driver channel order
pub fn reorder_channels<T>(mut channels: [Option<T>; CHANNEL_COUNT]) -> [Option<T>; CHANNEL_COUNT] {
    std::array::from_fn(|driver| channels[TRACKER_CHANNEL[driver]].take())
}

/// Move per-channel data from driver back to tracker channel order
pub fn restore_channel_order<T>(
    mut channels: [Option<T>; CHANNEL_COUNT],
) -> [Option<T>; CHANNEL_COUNT] {
    std::array::from_fn(|tracker| channels[CHANNEL_ORDER[tracker]].take())
}

/// Compilation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Size budget of the whole sound data
    pub max_sound_data_size: usize,
    /// First V-ROM address available to samples (in 256-byte units)
    pub vrom_offset: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_sound_data_size: SOUND_DATA_MAX_SIZE,
            vrom_offset: 0,
        }
    }
}

/// Event lists of a driver channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelData {
    /// Main list: one sub-pattern jump per pattern matrix row
    pub events: EventList,
    /// One sub-pattern per distinct tracker pattern, in pattern order
    pub sub_patterns: Vec<EventList>,
}

/// A song ready for layout
#[derive(Debug, Clone)]
pub struct Song {
    /// Indexed by driver channel
    pub channels: [Option<ChannelData>; CHANNEL_COUNT],
    pub instruments: Vec<DriverInstrument>,
    pub other_data: Vec<OtherData>,
    pub timer: TimerConfig,
    pub samples: Vec<PlacedSample>,
    /// SSG notes under the lowest octave were clamped
    pub notes_below_range: bool,
}

impl Default for Song {
    fn default() -> Self {
        Self {
            channels: std::array::from_fn(|_| None),
            instruments: Vec::new(),
            other_data: Vec::new(),
            timer: TimerConfig::default(),
            samples: Vec::new(),
            notes_below_range: false,
        }
    }
}

impl Song {
    /// Assemble a song from a tracker module
    ///
    /// Samples are placed in V-ROM from `vrom_offset` (256-byte units).
    pub fn from_module(module: &Module, vrom_offset: usize) -> Result<Self> {
        let mut song = Song {
            timer: frequency_to_timer(module.time_info.hz_value)?,
            samples: place_samples(&module.samples, vrom_offset),
            ..Song::default()
        };

        song.instruments_from_module(module)?;

        let mut channels: [Option<ChannelData>; CHANNEL_COUNT] = std::array::from_fn(|_| None);
        for (ch, column) in module.pattern_matrix.matrix.iter().enumerate().take(CHANNEL_COUNT) {
            if let Some(column) = column {
                channels[ch] = Some(song.channel_from_module(module, ch, column)?);
            }
        }
        song.channels = reorder_channels(channels);

        if song.notes_below_range {
            warn!("SSG notes lower than C2 present, they have been set to C2");
        }
        debug!(
            "Song assembled: {} matrix rows, {} instruments, {} samples",
            module.pattern_matrix.rows(),
            song.instruments.len(),
            song.samples.len()
        );
        Ok(song)
    }

    /// Build the instrument table and the other data it uses
    fn instruments_from_module(&mut self, module: &Module) -> Result<()> {
        if module.instruments.len() > MAX_INSTRUMENTS {
            return Err(Error::TooManyInstruments(module.instruments.len()));
        }

        for instrument in &module.instruments {
            let instrument = DriverInstrument::from_tracker(instrument, &mut self.other_data);
            self.instruments.push(instrument);
        }

        self.instruments.push(DriverInstrument::AdpcmA {
            sample_list: self.other_data.len(),
        });
        let addresses = self.samples.iter().map(|s| (s.start, s.end)).collect();
        self.other_data.push(OtherData::SampleList(addresses));

        Ok(())
    }

    /// Index of the ADPCM-A pseudo-instrument
    fn adpcma_instrument(&self) -> u8 {
        (self.instruments.len() - 1) as u8
    }

    /// Build a tracker channel's main list and its deduplicated sub-patterns
    fn channel_from_module(&mut self, module: &Module, ch: usize, column: &[u8]) -> Result<ChannelData> {
        let unique_patterns: Vec<u8> = column
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut events = EventList::main();
        if channel_kind(ch) == ChannelKind::AdpcmA {
            events.push(Command::ChangeInstrument {
                instrument: self.adpcma_instrument(),
            });
        }
        for pattern in column {
            // Every pattern of the column is in the set
            let sub_pattern = unique_patterns.binary_search(pattern).unwrap_or_default();
            events.push(Command::JumpToSubPattern { sub_pattern });
        }
        events.push(Command::EndOfEventList);

        let mut converter = PatternConverter::new(ch, module.time_info);
        let mut sub_patterns = Vec::with_capacity(unique_patterns.len());
        for &pattern in &unique_patterns {
            let source = module
                .pattern(ch, pattern)
                .ok_or(Error::MissingPattern { channel: ch, pattern })?;
            sub_patterns.push(converter.convert(source)?);
        }
        self.notes_below_range |= converter.notes_below_range;

        debug!(
            "Channel {}: {} matrix rows, {} sub-patterns",
            ch,
            column.len(),
            sub_patterns.len()
        );

        Ok(ChannelData {
            events,
            sub_patterns,
        })
    }

    /// Channel data of a tracker channel
    pub fn tracker_channel(&self, ch: usize) -> Option<&ChannelData> {
        self.channels.get(*CHANNEL_ORDER.get(ch)?)?.as_ref()
    }

    /// First V-ROM unit after this song's samples
    pub fn vrom_end(&self, vrom_offset: usize) -> usize {
        self.samples.last().map_or(vrom_offset, |s| s.end + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::event::SongEvent;
    use crate::tracker::{FmInstrument, Instrument, Pattern, PatternMatrix, Row, TimeInfo};

    fn module_with(ch: usize, column: Vec<u8>, patterns: Vec<Pattern>) -> Module {
        let mut matrix = vec![None; SYSTEM_TOTAL_CHANNELS];
        matrix[ch] = Some(column);
        let mut table = vec![Vec::new(); SYSTEM_TOTAL_CHANNELS];
        table[ch] = patterns;

        Module {
            time_info: TimeInfo::default(),
            pattern_matrix: PatternMatrix { matrix },
            patterns: table,
            ..Module::default()
        }
    }

    #[test]
    fn test_channel_order_is_a_bijection() {
        let tracker: [Option<usize>; CHANNEL_COUNT] = std::array::from_fn(Some);
        let driver = reorder_channels(tracker);

        assert_eq!(driver[6], Some(0)); // FM1
        assert_eq!(driver[10], Some(4)); // SSG1
        assert_eq!(driver[0], Some(7)); // ADPCM-A1
        assert_eq!(restore_channel_order(driver), tracker);

        for driver in 0..CHANNEL_COUNT {
            assert_eq!(CHANNEL_ORDER[TRACKER_CHANNEL[driver]], driver);
        }
    }

    #[test]
    fn test_main_list_jumps_to_deduplicated_patterns() {
        let module = module_with(
            0,
            vec![3, 1, 3, 1],
            vec![
                Pattern::empty(2),
                Pattern::empty(2),
                Pattern::empty(2),
                Pattern::empty(2),
            ],
        );
        let song = Song::from_module(&module, 0).unwrap();
        let channel = song.channels[6].as_ref().unwrap();

        let commands: Vec<_> = channel.events.iter().map(|e| e.command).collect();
        assert_eq!(
            commands,
            vec![
                Command::JumpToSubPattern { sub_pattern: 1 },
                Command::JumpToSubPattern { sub_pattern: 0 },
                Command::JumpToSubPattern { sub_pattern: 1 },
                Command::JumpToSubPattern { sub_pattern: 0 },
                Command::EndOfEventList,
            ]
        );
        assert_eq!(channel.sub_patterns.len(), 2);
        assert!(song.channels.iter().enumerate().all(|(i, c)| i == 6 || c.is_none()));
    }

    #[test]
    fn test_adpcma_channel_selects_pseudo_instrument() {
        let mut module = module_with(7, vec![0], vec![Pattern::empty(1)]);
        module.instruments = vec![Instrument::Fm(FmInstrument::default()); 2];
        let song = Song::from_module(&module, 0).unwrap();

        assert_eq!(song.instruments.len(), 3);
        assert_eq!(
            song.instruments[2],
            DriverInstrument::AdpcmA { sample_list: 0 }
        );
        let channel = song.tracker_channel(7).unwrap();
        assert_eq!(
            channel.events.events[0],
            SongEvent::new(Command::ChangeInstrument { instrument: 2 })
        );
        assert!(song.channels[0].is_some());
    }

    #[test]
    fn test_missing_pattern() {
        let module = module_with(1, vec![0, 2], vec![Pattern::empty(1)]);
        assert!(matches!(
            Song::from_module(&module, 0),
            Err(Error::MissingPattern {
                channel: 1,
                pattern: 2
            })
        ));
    }

    #[test]
    fn test_too_many_instruments() {
        let mut module = module_with(0, vec![0], vec![Pattern::empty(1)]);
        module.instruments = vec![Instrument::Fm(FmInstrument::default()); MAX_INSTRUMENTS];
        assert!(Song::from_module(&module, 0).is_ok());

        module.instruments.push(Instrument::Fm(FmInstrument::default()));
        assert!(matches!(
            Song::from_module(&module, 0),
            Err(Error::TooManyInstruments(255))
        ));
    }

    #[test]
    fn test_unsupported_frequency() {
        let mut module = module_with(0, vec![0], vec![Pattern::empty(1)]);
        module.time_info.hz_value = 60000.0;
        assert!(matches!(
            Song::from_module(&module, 0),
            Err(Error::UnsupportedFrequency(_))
        ));
    }

    #[test]
    fn test_ssg_clamp_flag() {
        let mut pattern = Pattern::empty(1);
        pattern.rows[0] = Row::note(1, 1);
        let song = Song::from_module(&module_with(5, vec![0], vec![pattern]), 0).unwrap();
        assert!(song.notes_below_range);
    }

    #[test]
    fn test_note_out_of_range_is_an_error() {
        let mut pattern = Pattern::empty(1);
        pattern.rows[0] = Row::note(5, 30);
        assert!(matches!(
            Song::from_module(&module_with(4, vec![0], vec![pattern]), 0),
            Err(Error::NoteOutOfRange {
                channel: 4,
                note: 5,
                octave: 30
            })
        ));

        let mut pattern = Pattern::empty(1);
        pattern.rows[0] = Row::note(12, 255);
        assert!(matches!(
            Song::from_module(&module_with(0, vec![0], vec![pattern]), 0),
            Err(Error::NoteOutOfRange { channel: 0, .. })
        ));
    }
}
