//! # img-delta
//!
//! Directory-oriented image delta tool. Given a directory of original images
//! and a parallel directory of identically named edits, it writes one *diff
//! image* per file holding only the changed pixels; given the originals and
//! those diffs, it rebuilds the edits.
//!
//! # Architecture
//!
//! ```text
//! config   --input/--compare/--output + --generate|--apply  →  Invocation
//! batch    list input dir → probe compare dir → read both → transform → write
//! diff     generate(O, E) → D          apply(O, D) → E
//! ```
//!
//! The two transforms in [`diff`] are pure functions over in-memory
//! [`imaging::Image`]s. All file access goes through the
//! [`imaging::ImageBackend`] trait so the batch driver can be tested against
//! an in-memory backend.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Image model (bounds, palette/truecolor storage), PNG backend |
//! | [`diff`] | The codec: `generate` and `apply` |
//! | [`batch`] | Per-directory driver with per-file fault isolation |
//! | [`config`] | Option validation and mode selection |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## In-Band Sentinel
//!
//! "Unchanged" is encoded as a color from the image's own color space:
//! palette entry 0 for indexed images, transparent black for RGBA images. A
//! diff is therefore an ordinary PNG that any viewer can open, at the cost of
//! not being able to express an edit *to* the sentinel color.
//!
//! ## Palette Identity
//!
//! Indexed PNGs are read and written with the `png` crate directly rather
//! than through `image`, which would expand them to RGBA. The palette order
//! has to survive a write/read cycle because entry 0 is the sentinel.
//!
//! ## Report and Continue
//!
//! Per-file failures (unreadable file, size mismatch, failed write) are
//! reported and counted; they never abort the batch. Only failing to list
//! the input directory ends a run early.

pub mod batch;
pub mod config;
pub mod diff;
pub mod imaging;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
