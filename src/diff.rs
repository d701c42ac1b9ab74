//! The diff codec: per-pixel delta images and their application.
//!
//! A diff has the same bounds and color model as the original it was derived
//! from. Each diff pixel is either the model's sentinel, meaning "unchanged",
//! or a literal replacement color:
//!
//! | Original model | Diff model | Sentinel |
//! |---|---|---|
//! | Palette-indexed | Same palette, entry-for-entry | palette entry 0 |
//! | Truecolor RGBA | Truecolor RGBA | `(0, 0, 0, 0)` |
//!
//! ```text
//! generate(O, E) = D      D(x,y) = E(x,y) where O(x,y) != E(x,y), else sentinel
//! apply(O, D)    = R      R(x,y) = O(x,y) where D(x,y) == sentinel, else D(x,y)
//! ```
//!
//! ## Sentinel aliasing
//!
//! The sentinel lives in the image's own color space so a diff is an ordinary
//! image file. The cost: an edit that changes a pixel *to* the sentinel color
//! is encoded as the sentinel and reads back as "unchanged". `apply` then
//! restores the original pixel there.
//!
//! ## Mixed color models
//!
//! The output model is always picked from the original. When the original is
//! palette-indexed and the other image is not, incoming colors go through
//! [`Image::set`], which snaps them to the nearest palette entry.

use crate::imaging::{Bounds, Image};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    #[error("Image bounds do not match: {original} vs {other}")]
    BoundsMismatch { original: Bounds, other: Bounds },
}

fn check_bounds(original: &Image, other: &Image) -> Result<(), DiffError> {
    if original.bounds() != other.bounds() {
        return Err(DiffError::BoundsMismatch {
            original: original.bounds(),
            other: other.bounds(),
        });
    }
    Ok(())
}

/// Build the diff turning `original` into `edited`.
pub fn generate(original: &Image, edited: &Image) -> Result<Image, DiffError> {
    check_bounds(original, edited)?;

    // Allocation is sentinel-filled; only changed pixels need writing.
    let mut diff = Image::blank_like(original);
    for (x, y) in original.bounds().points() {
        let edited_color = edited.at(x, y);
        if original.at(x, y) != edited_color {
            diff.set(x, y, edited_color);
        }
    }
    Ok(diff)
}

/// Reconstruct the edited image from `original` and a diff made by [`generate`].
pub fn apply(original: &Image, diff: &Image) -> Result<Image, DiffError> {
    check_bounds(original, diff)?;

    let sentinel = original.sentinel();
    let mut result = Image::blank_like(original);
    for (x, y) in original.bounds().points() {
        let delta = diff.at(x, y);
        let color = if delta == sentinel {
            original.at(x, y)
        } else {
            delta
        };
        result.set(x, y, color);
    }
    Ok(result)
}
