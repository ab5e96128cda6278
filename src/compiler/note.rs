//! Note and volume conversions

use crate::tracker::ChannelKind;

/// Lowest octave the SSG channels can play
pub const SSG_MIN_OCTAVE: u8 = 2;

/// Note value converted for the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverNote {
    pub value: u8,
    /// The note was under the channel's range and has been clamped
    pub below_range: bool,
}

/// Convert a channel volume to the global driver volume (0x00-0xFF)
pub fn volume_to_driver(kind: ChannelKind, volume: u8) -> u8 {
    let shift = match kind {
        ChannelKind::AdpcmA => 3,
        ChannelKind::Fm => 1,
        ChannelKind::Ssg => 4,
    };
    volume << shift
}

/// Convert a tracker note to a driver note
///
/// The tracker writes C as note 12 of the previous octave.
/// For ADPCM-A channels the note is a sample index and passes through.
/// Returns `None` when the note doesn't fit in a driver note byte.
pub fn note_to_driver(kind: ChannelKind, note: u8, octave: u8) -> Option<DriverNote> {
    let (note, octave) = if note == 12 {
        (0, octave.checked_add(1)?)
    } else {
        (note, octave)
    };

    let converted = match kind {
        ChannelKind::Fm => DriverNote {
            value: u8::try_from(u32::from(note) | u32::from(octave) << 4).ok()?,
            below_range: false,
        },
        ChannelKind::Ssg if octave < SSG_MIN_OCTAVE => DriverNote {
            value: 0,
            below_range: true,
        },
        ChannelKind::Ssg => DriverNote {
            value: (octave - SSG_MIN_OCTAVE)
                .checked_mul(12)?
                .checked_add(note)?,
            below_range: false,
        },
        ChannelKind::AdpcmA => DriverNote {
            value: note,
            below_range: false,
        },
    };
    Some(converted)
}
