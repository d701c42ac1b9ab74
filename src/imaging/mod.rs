//! In-memory raster model shared by the diff codec and the file backend.
//!
//! | Item | Role |
//! |---|---|
//! | [`Image`] | Bounded pixel grid, palette-indexed or truecolor RGBA |
//! | [`Bounds`] | `(min_x, min_y)-(max_x, max_y)` rectangle, max exclusive |
//! | [`Color`] | Non-premultiplied 8-bit RGBA, the value `at` returns |
//! | [`ColorModel`] | Which of the two storage variants an image uses |
//! | [`Palette`] | Ordered color table, entry 0 is the transparent slot |
//!
//! The module is split into:
//! - **Model**: this file, pure and allocation-only
//! - **Palette**: nearest-entry snapping used by [`Image::set`]
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`] (PNG on disk)

pub mod backend;
pub mod palette;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use palette::{Palette, PaletteError};
pub use rust_backend::RustBackend;

use image::{Rgba, RgbaImage};
use std::fmt;

/// A single pixel value as seen through [`Image::at`].
pub type Color = Rgba<u8>;

/// Fully transparent black, the "unchanged" sentinel of truecolor diffs.
pub const TRANSPARENT: Color = Rgba([0, 0, 0, 0]);

/// Pixel rectangle. `max_x`/`max_y` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    /// Build a rectangle from two corners, swapping coordinates so that
    /// `min <= max` on both axes.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Rectangle anchored at the origin. Decoded files always use this form.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, clamp_dim(width), clamp_dim(height))
    }

    pub fn width(&self) -> u32 {
        self.max_x.abs_diff(self.min_x)
    }

    pub fn height(&self) -> u32 {
        self.max_y.abs_diff(self.min_y)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Every coordinate inside the rectangle, row-major.
    pub fn points(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let Bounds {
            min_x,
            min_y,
            max_x,
            max_y,
        } = *self;
        (min_y..max_y).flat_map(move |y| (min_x..max_x).map(move |x| (x, y)))
    }

    fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }
}

fn clamp_dim(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Storage variant of an [`Image`], borrowed from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel<'a> {
    Paletted(&'a Palette),
    Truecolor,
}

impl ColorModel<'_> {
    /// The color a diff in this model uses to mean "pixel unchanged".
    pub fn sentinel(&self) -> Color {
        match self {
            ColorModel::Paletted(palette) => palette.transparent_slot(),
            ColorModel::Truecolor => TRANSPARENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pixels {
    Paletted { palette: Palette, indices: Vec<u8> },
    Truecolor(RgbaImage),
}

/// A rectangular grid of pixels in one of two color models.
///
/// Freshly allocated images are zero-filled: index 0 for palette images and
/// [`TRANSPARENT`] for truecolor images. Both equal the model's sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    bounds: Bounds,
    pixels: Pixels,
}

impl Image {
    /// Allocate a truecolor RGBA image filled with [`TRANSPARENT`].
    pub fn truecolor(bounds: Bounds) -> Self {
        Self {
            bounds,
            pixels: Pixels::Truecolor(RgbaImage::new(bounds.width(), bounds.height())),
        }
    }

    /// Allocate a palette image with every pixel pointing at entry 0.
    pub fn paletted(bounds: Bounds, palette: Palette) -> Self {
        Self {
            bounds,
            pixels: Pixels::Paletted {
                palette,
                indices: vec![0; bounds.pixel_count()],
            },
        }
    }

    /// Allocate a sentinel-filled image with the same bounds and color model
    /// as `template`. Palette images share the template's palette entry-for-entry.
    pub fn blank_like(template: &Image) -> Self {
        match template.color_model() {
            ColorModel::Paletted(palette) => Self::paletted(template.bounds, palette.clone()),
            ColorModel::Truecolor => Self::truecolor(template.bounds),
        }
    }

    /// Wrap a decoded RGBA buffer, anchored at the origin.
    pub fn from_rgba(buffer: RgbaImage) -> Self {
        Self {
            bounds: Bounds::from_size(buffer.width(), buffer.height()),
            pixels: Pixels::Truecolor(buffer),
        }
    }

    /// Wrap raw row-major palette indices. Every index must address an entry.
    pub fn from_indices(
        bounds: Bounds,
        palette: Palette,
        indices: Vec<u8>,
    ) -> Result<Self, PaletteError> {
        let expected = bounds.pixel_count();
        if indices.len() != expected {
            return Err(PaletteError::LengthMismatch {
                expected,
                actual: indices.len(),
            });
        }
        if let Some(&index) = indices.iter().find(|&&i| palette.get(i).is_none()) {
            return Err(PaletteError::IndexOutOfRange {
                index,
                len: palette.len(),
            });
        }
        Ok(Self {
            bounds,
            pixels: Pixels::Paletted { palette, indices },
        })
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn color_model(&self) -> ColorModel<'_> {
        match &self.pixels {
            Pixels::Paletted { palette, .. } => ColorModel::Paletted(palette),
            Pixels::Truecolor(_) => ColorModel::Truecolor,
        }
    }

    pub fn sentinel(&self) -> Color {
        self.color_model().sentinel()
    }

    pub fn palette(&self) -> Option<&Palette> {
        match &self.pixels {
            Pixels::Paletted { palette, .. } => Some(palette),
            Pixels::Truecolor(_) => None,
        }
    }

    /// Raw row-major palette indices, `None` for truecolor images.
    pub fn indices(&self) -> Option<&[u8]> {
        match &self.pixels {
            Pixels::Paletted { indices, .. } => Some(indices),
            Pixels::Truecolor(_) => None,
        }
    }

    /// Palette and raw indices of a palette image.
    pub fn as_indexed(&self) -> Option<(&Palette, &[u8])> {
        match &self.pixels {
            Pixels::Paletted { palette, indices } => Some((palette, indices)),
            Pixels::Truecolor(_) => None,
        }
    }

    /// The RGBA buffer backing a truecolor image.
    pub fn as_rgba(&self) -> Option<&RgbaImage> {
        match &self.pixels {
            Pixels::Truecolor(buffer) => Some(buffer),
            Pixels::Paletted { .. } => None,
        }
    }

    /// Color at `(x, y)`. Palette images resolve the index through the
    /// palette. Coordinates outside the bounds read as [`TRANSPARENT`].
    pub fn at(&self, x: i32, y: i32) -> Color {
        let Some((col, row)) = self.local(x, y) else {
            return TRANSPARENT;
        };
        match &self.pixels {
            Pixels::Paletted { palette, indices } => {
                let index = indices[row as usize * self.bounds.width() as usize + col as usize];
                palette.get(index).unwrap_or(TRANSPARENT)
            }
            Pixels::Truecolor(buffer) => *buffer.get_pixel(col, row),
        }
    }

    /// Store `color` at `(x, y)`. Palette images snap the color to the
    /// nearest entry. Writes outside the bounds are ignored.
    pub fn set(&mut self, x: i32, y: i32, color: Color) {
        let Some((col, row)) = self.local(x, y) else {
            return;
        };
        let width = self.bounds.width() as usize;
        match &mut self.pixels {
            Pixels::Paletted { palette, indices } => {
                indices[row as usize * width + col as usize] = palette.nearest(color);
            }
            Pixels::Truecolor(buffer) => buffer.put_pixel(col, row, color),
        }
    }

    /// True when both images share bounds and every pixel compares equal
    /// by color, regardless of how each image stores it.
    pub fn same_pixels(&self, other: &Image) -> bool {
        self.bounds == other.bounds
            && self
                .bounds
                .points()
                .all(|(x, y)| self.at(x, y) == other.at(x, y))
    }

    fn local(&self, x: i32, y: i32) -> Option<(u32, u32)> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        Some((
            x.abs_diff(self.bounds.min_x),
            y.abs_diff(self.bounds.min_y),
        ))
    }
}
