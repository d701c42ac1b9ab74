//! Ordered color tables for palette-indexed images.
//!
//! Entry order is part of an image's identity: entry 0 is the transparent
//! slot that palette diffs use as their "unchanged" sentinel, so a palette is
//! never sorted, deduplicated or compacted.

use super::Color;
use thiserror::Error;

/// Largest palette an 8-bit index can address.
pub const MAX_ENTRIES: usize = 256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaletteError {
    #[error("Palette has no entries")]
    Empty,
    #[error("Palette has {0} entries, at most 256 are supported")]
    TooManyEntries(usize),
    #[error("Palette index {index} exceeds palette size of {len}")]
    IndexOutOfRange { index: u8, len: usize },
    #[error("Pixel buffer holds {actual} indices, bounds need {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(Vec<Color>);

impl Palette {
    pub fn new(entries: Vec<Color>) -> Result<Self, PaletteError> {
        match entries.len() {
            0 => Err(PaletteError::Empty),
            n if n > MAX_ENTRIES => Err(PaletteError::TooManyEntries(n)),
            _ => Ok(Self(entries)),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[Color] {
        &self.0
    }

    pub fn get(&self, index: u8) -> Option<Color> {
        self.0.get(index as usize).copied()
    }

    /// Entry 0.
    pub fn transparent_slot(&self) -> Color {
        self.0[0]
    }

    /// Index of the entry closest to `color`.
    ///
    /// Distance is the sum of squared differences of 16-bit premultiplied
    /// channels, each square shifted right by 2 so four of them fit a `u32`.
    /// The first exact match wins; otherwise ties resolve to the lowest index.
    pub fn nearest(&self, color: Color) -> u8 {
        let target = premultiplied(color);
        let mut best = 0;
        let mut best_sum = u32::MAX;
        for (i, entry) in self.0.iter().enumerate() {
            let candidate = premultiplied(*entry);
            let sum = target
                .iter()
                .zip(candidate.iter())
                .map(|(&a, &b)| sq_diff(a, b))
                .sum::<u32>();
            if sum < best_sum {
                // Palette length is capped at 256 by construction.
                best = i as u8;
                if sum == 0 {
                    break;
                }
                best_sum = sum;
            }
        }
        best
    }
}

/// Channels widened to 16 bits and multiplied by alpha.
fn premultiplied(color: Color) -> [u32; 4] {
    let [r, g, b, a] = color.0.map(|c| c as u32 * 0x101);
    [r * a / 0xffff, g * a / 0xffff, b * a / 0xffff, a]
}

fn sq_diff(x: u32, y: u32) -> u32 {
    let d = x.abs_diff(y);
    (d * d) >> 2
}
