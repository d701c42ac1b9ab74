//! PNG file backend built on the `image` and `png` crates.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Sniff container | `image::guess_format` |
//! | Decode indexed PNG | `png::Decoder` with identity transformations |
//! | Decode any other PNG | `image::load_from_memory` → RGBA8 |
//! | Encode indexed PNG | `png::Encoder` (8-bit, `PLTE` + trimmed `tRNS`) |
//! | Encode truecolor PNG | `image::codecs::png::PngEncoder` (RGBA8) |
//! | List directory | `walkdir`, depth 1 |
//!
//! Indexed files bypass the `image` crate on purpose: it expands palettes to
//! RGB(A) during decode, which would lose the entry order the diff codec
//! relies on.

use super::backend::{BackendError, ImageBackend};
use super::{Bounds, Image, Palette, PaletteError};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, Rgba, RgbaImage};
use log::debug;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Cursor, Write};
use std::path::Path;
use walkdir::WalkDir;

/// Backend reading and writing PNG files on the local filesystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn list_files(&self, dir: &Path) -> Result<Vec<OsString>, BackendError> {
        let mut names = Vec::new();
        for entry in WalkDir::new(dir).max_depth(1).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                // The root itself failing means the listing failed; a single
                // bad child (e.g. a dangling symlink) only drops that name.
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    debug!("skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            if entry.depth() == 0 {
                if !entry.file_type().is_dir() {
                    return Err(io::Error::new(
                        io::ErrorKind::NotADirectory,
                        format!("{} is not a directory", dir.display()),
                    )
                    .into());
                }
                continue;
            }
            if entry.file_type().is_dir() {
                continue;
            }
            names.push(entry.file_name().to_os_string());
        }
        Ok(names)
    }

    fn probe(&self, path: &Path) -> bool {
        fs::metadata(path).is_ok()
    }

    fn read_image(&self, path: &Path) -> Result<Image, BackendError> {
        let bytes = fs::read(path)?;
        if is_png(&bytes) {
            if let Some(image) = decode_indexed_png(&bytes, path)? {
                return Ok(image);
            }
        }
        let decoded = image::load_from_memory(&bytes).map_err(|e| {
            BackendError::Decode(format!("Failed to decode {}: {}", path.display(), e))
        })?;
        let buffer = decoded.to_rgba8();
        debug!(
            "{}: truecolor {}x{}",
            path.display(),
            buffer.width(),
            buffer.height()
        );
        Ok(Image::from_rgba(buffer))
    }

    fn write_image(&self, image: &Image, path: &Path) -> Result<(), BackendError> {
        let bounds = image.bounds();
        if bounds.is_empty() {
            return Err(BackendError::Encode(format!(
                "Cannot encode zero-area image {} to {}",
                bounds,
                path.display()
            )));
        }

        let mut writer = BufWriter::new(File::create(path)?);
        if let Some((palette, indices)) = image.as_indexed() {
            encode_indexed(&mut writer, bounds, palette, indices)?;
        } else if let Some(buffer) = image.as_rgba() {
            encode_rgba(&mut writer, buffer)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn is_png(bytes: &[u8]) -> bool {
    image::guess_format(bytes).is_ok_and(|format| format == ImageFormat::Png)
}

/// Decode a PNG whose header declares an indexed color type, keeping the raw
/// indices and the palette order. Returns `None` for any other color type.
fn decode_indexed_png(bytes: &[u8], path: &Path) -> Result<Option<Image>, BackendError> {
    let decode_err = |e: png::DecodingError| {
        BackendError::Decode(format!("Failed to decode {}: {}", path.display(), e))
    };

    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info().map_err(decode_err)?;

    let info = reader.info();
    if info.color_type != png::ColorType::Indexed {
        return Ok(None);
    }
    let palette = palette_from_chunks(
        info.palette.as_deref().unwrap_or_default(),
        info.trns.as_deref(),
    )?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf).map_err(decode_err)?;
    let indices = unpack_indices(
        &buf[..frame.buffer_size()],
        frame.width,
        frame.height,
        frame.line_size,
        frame.bit_depth as u8,
    );
    debug!(
        "{}: indexed {}x{}, {} palette entries",
        path.display(),
        frame.width,
        frame.height,
        palette.len()
    );

    let bounds = Bounds::from_size(frame.width, frame.height);
    Ok(Some(Image::from_indices(bounds, palette, indices)?))
}

/// Build a palette from raw `PLTE` triples and optional `tRNS` alphas.
/// Entries past the end of `tRNS` are opaque.
fn palette_from_chunks(plte: &[u8], trns: Option<&[u8]>) -> Result<Palette, PaletteError> {
    let alphas = trns.unwrap_or_default();
    let entries = plte
        .chunks_exact(3)
        .enumerate()
        .map(|(i, rgb)| {
            let alpha = alphas.get(i).copied().unwrap_or(0xff);
            Rgba([rgb[0], rgb[1], rgb[2], alpha])
        })
        .collect();
    Palette::new(entries)
}

/// Split `PLTE` and `tRNS` payloads. `tRNS` stops after the last non-opaque
/// entry and is empty when every entry is opaque.
fn palette_chunks(palette: &Palette) -> (Vec<u8>, Vec<u8>) {
    let entries = palette.entries();
    let plte = entries.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    let keep = entries
        .iter()
        .rposition(|c| c[3] != 0xff)
        .map_or(0, |last| last + 1);
    let trns = entries[..keep].iter().map(|c| c[3]).collect();
    (plte, trns)
}

/// Expand packed 1/2/4/8-bit scanlines to one index per byte.
fn unpack_indices(data: &[u8], width: u32, height: u32, line_size: usize, depth: u8) -> Vec<u8> {
    if width == 0 || height == 0 || line_size == 0 {
        return Vec::new();
    }
    let depth = depth as usize;
    let per_byte = 8 / depth;
    let mask = ((1u16 << depth) - 1) as u8;

    let mut indices = Vec::with_capacity(width as usize * height as usize);
    for row in data.chunks(line_size).take(height as usize) {
        for x in 0..width as usize {
            let byte = row[x / per_byte];
            let shift = 8 - depth * (x % per_byte + 1);
            indices.push((byte >> shift) & mask);
        }
    }
    indices
}

fn encode_indexed<W: Write>(
    writer: W,
    bounds: Bounds,
    palette: &Palette,
    indices: &[u8],
) -> Result<(), BackendError> {
    let encode_err = |e: png::EncodingError| BackendError::Encode(e.to_string());

    let (plte, trns) = palette_chunks(palette);
    let mut encoder = png::Encoder::new(writer, bounds.width(), bounds.height());
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(plte);
    if !trns.is_empty() {
        encoder.set_trns(trns);
    }

    let mut png_writer = encoder.write_header().map_err(encode_err)?;
    png_writer.write_image_data(indices).map_err(encode_err)?;
    png_writer.finish().map_err(encode_err)
}

fn encode_rgba<W: Write>(writer: W, buffer: &RgbaImage) -> Result<(), BackendError> {
    PngEncoder::new(writer)
        .write_image(
            buffer.as_raw(),
            buffer.width(),
            buffer.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| BackendError::Encode(e.to_string()))
}
