//! ADPCM-A sample placement in V-ROM

use crate::tracker::Sample;

/// Sample addresses are expressed in units of this many bytes
pub const VROM_UNIT: usize = 256;

/// Samples can't cross a 1 MiB bank (`address >> 12` in 256-byte units)
pub const VROM_BANK_SHIFT: usize = 12;

/// Sample with its V-ROM address range (inclusive, in 256-byte units)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedSample {
    pub sample: Sample,
    pub start: usize,
    pub end: usize,
}

impl PlacedSample {
    /// Number of 256-byte units the sample occupies
    pub fn units(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Lay out samples one after the other from `vrom_offset`
pub fn place_samples(samples: &[Sample], vrom_offset: usize) -> Vec<PlacedSample> {
    let mut placed = Vec::with_capacity(samples.len());
    let mut start = vrom_offset;

    for sample in samples {
        let units = sample.data.len().div_ceil(VROM_UNIT).max(1);
        let mut end = start + units - 1;

        if start >> VROM_BANK_SHIFT != end >> VROM_BANK_SHIFT {
            start = (end >> VROM_BANK_SHIFT) << VROM_BANK_SHIFT;
            end = start + units - 1;
        }

        placed.push(PlacedSample {
            sample: sample.clone(),
            start,
            end,
        });
        start = end + 1;
    }

    placed
}

/// Build the V-ROM image of placed samples, starting at `vrom_offset`
pub fn vrom_image<'a>(
    samples: impl IntoIterator<Item = &'a PlacedSample>,
    vrom_offset: usize,
) -> Vec<u8> {
    let mut image = Vec::new();

    for placed in samples {
        let start = (placed.start - vrom_offset) * VROM_UNIT;
        let end = start + placed.units() * VROM_UNIT;
        if image.len() < end {
            image.resize(end, 0);
        }
        image[start..start + placed.sample.data.len()].copy_from_slice(&placed.sample.data);
    }

    image
}
