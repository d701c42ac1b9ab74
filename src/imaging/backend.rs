//! Image file backend trait and shared error type.
//!
//! The [`ImageBackend`] trait is everything the batch driver needs from the
//! outside world: list a directory, probe for a file, read an image, write an
//! image. The diff codec itself never touches the filesystem.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the in-memory
//! `MockBackend` from this module.

use super::{Image, PaletteError};
use std::ffi::OsString;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory listing failed: {0}")]
    Listing(#[from] walkdir::Error),
    #[error("Decoding failed: {0}")]
    Decode(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
    #[error("Invalid palette data: {0}")]
    Palette(#[from] PaletteError),
}

/// Trait for image file backends.
pub trait ImageBackend {
    /// Names of the non-directory entries directly inside `dir`, in whatever
    /// order the backend produces them.
    fn list_files(&self, dir: &Path) -> Result<Vec<OsString>, BackendError>;

    /// Whether `path` exists and its metadata can be read.
    fn probe(&self, path: &Path) -> bool;

    /// Decode the file at `path` into an [`Image`].
    fn read_image(&self, path: &Path) -> Result<Image, BackendError>;

    /// Encode `image` to `path`, replacing any existing file.
    fn write_image(&self, image: &Image, path: &Path) -> Result<(), BackendError>;
}
