//! Shared test utilities for the img-delta test suite.
//!
//! Provides color shorthands and image builders so codec and batch tests can
//! describe pixels inline.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let original = paletted_image(2, 1, traffic_palette(), &[1, 1]);
//! let edited = truecolor_image(1, 1, &[rgb(40, 50, 60)]);
//! ```

use crate::imaging::{Bounds, Color, Image, Palette};
use image::{Rgba, RgbaImage};

// =========================================================================
// Colors
// =========================================================================

pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
    Rgba([r, g, b, a])
}

/// Opaque color.
pub fn rgb(r: u8, g: u8, b: u8) -> Color {
    rgba(r, g, b, 255)
}

/// `[transparent, red, green]`, the usual three-entry test palette.
pub fn traffic_palette() -> Palette {
    Palette::new(vec![rgba(0, 0, 0, 0), rgb(255, 0, 0), rgb(0, 255, 0)]).unwrap()
}

// =========================================================================
// Image builders: panic on malformed input
// =========================================================================

/// Truecolor image at the origin from row-major pixels.
pub fn truecolor_image(width: u32, height: u32, pixels: &[Color]) -> Image {
    assert_eq!(
        pixels.len(),
        (width * height) as usize,
        "pixel count does not match {width}x{height}"
    );
    let raw = pixels.iter().flat_map(|c| c.0).collect();
    Image::from_rgba(RgbaImage::from_raw(width, height, raw).unwrap())
}

/// Palette image at the origin from row-major indices.
pub fn paletted_image(width: u32, height: u32, palette: Palette, indices: &[u8]) -> Image {
    Image::from_indices(Bounds::from_size(width, height), palette, indices.to_vec())
        .unwrap_or_else(|e| panic!("invalid test image: {e}"))
}

/// Truecolor image filled with a single color.
pub fn solid(width: u32, height: u32, color: Color) -> Image {
    Image::from_rgba(RgbaImage::from_pixel(width, height, color))
}
