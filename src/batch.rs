//! Directory batch driver.
//!
//! Walks the input directory and, for every file that also exists in the
//! compare directory, runs the selected transform and writes the result
//! under the same name in the output directory.
//!
//! ## Per-file lifecycle
//!
//! ```text
//! Discovered → SecondaryProbed ─┬─ Skipped                    (no counterpart)
//!                               └─ PrimaryRead → SecondaryRead → Transformed → Written
//! ```
//!
//! Any step after the probe may fail. The failure is reported as a
//! [`BatchEvent::Failed`] and the driver moves on to the next file, so one
//! bad file never aborts the batch. Only failing to list the input directory
//! at all is fatal ([`BatchError::InputList`]).
//!
//! ## Ordering
//!
//! Files are handled in the order the backend lists them. Every file's
//! outcome depends only on its own inputs, so the set of outputs does not
//! depend on that order.

use crate::config::{Invocation, Transform};
use crate::diff::DiffError;
use crate::imaging::{BackendError, ImageBackend, RustBackend};
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Could not list input directory {}: {source}", .path.display())]
    InputList {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// Why a single file produced no output.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("Could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("{0}")]
    Transform(#[from] DiffError),
    #[error("Could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// Progress notifications, emitted in processing order.
#[derive(Debug)]
pub enum BatchEvent {
    /// No counterpart in the compare directory; nothing else happens.
    Skipped { name: String },
    /// Both files exist and processing is starting.
    Processing { name: String },
    Written { name: String, output: PathBuf },
    Failed { name: String, error: FileError },
}

/// Per-run outcome counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub written: u32,
    pub failed: u32,
    pub skipped: u32,
}

impl BatchStats {
    pub fn total(&self) -> u32 {
        self.written + self.failed + self.skipped
    }
}

impl fmt::Display for BatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} written, {} failed, {} skipped",
            self.written, self.failed, self.skipped
        )
    }
}

/// Run a batch against the local filesystem.
pub fn run(
    invocation: &Invocation,
    on_event: impl FnMut(BatchEvent),
) -> Result<BatchStats, BatchError> {
    run_with_backend(&RustBackend::new(), invocation, on_event)
}

/// Run a batch using a specific backend (allows testing with mock).
pub fn run_with_backend(
    backend: &impl ImageBackend,
    invocation: &Invocation,
    mut on_event: impl FnMut(BatchEvent),
) -> Result<BatchStats, BatchError> {
    let names = backend
        .list_files(&invocation.input)
        .map_err(|source| BatchError::InputList {
            path: invocation.input.clone(),
            source,
        })?;
    debug!(
        "{}: {} entries in {}",
        invocation.mode,
        names.len(),
        invocation.input.display()
    );

    let transform = invocation.mode.transform();
    let mut stats = BatchStats::default();

    for file_name in names {
        let name = file_name.to_string_lossy().into_owned();
        let secondary = invocation.compare.join(&file_name);

        if !backend.probe(&secondary) {
            debug!(
                "skipping {name}: no counterpart in {} ({})",
                invocation.compare.display(),
                invocation.mode.compare_role()
            );
            stats.skipped += 1;
            on_event(BatchEvent::Skipped { name });
            continue;
        }

        on_event(BatchEvent::Processing { name: name.clone() });

        let primary = invocation.input.join(&file_name);
        let output = invocation.output.join(&file_name);
        match process_file(backend, transform, &primary, &secondary, &output) {
            Ok(()) => {
                debug!("wrote {}", output.display());
                stats.written += 1;
                on_event(BatchEvent::Written { name, output });
            }
            Err(error) => {
                stats.failed += 1;
                on_event(BatchEvent::Failed { name, error });
            }
        }
    }

    Ok(stats)
}

/// Read both inputs, transform, write. Inputs are dropped before returning.
fn process_file(
    backend: &impl ImageBackend,
    transform: Transform,
    primary: &Path,
    secondary: &Path,
    output: &Path,
) -> Result<(), FileError> {
    let read = |path: &Path| {
        backend.read_image(path).map_err(|source| FileError::Read {
            path: path.to_path_buf(),
            source,
        })
    };

    let original = read(primary)?;
    let other = read(secondary)?;
    let result = transform(&original, &other)?;

    backend
        .write_image(&result, output)
        .map_err(|source| FileError::Write {
            path: output.to_path_buf(),
            source,
        })
}
