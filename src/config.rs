//! Invocation options and mode selection.
//!
//! The command line carries five options and no positional arguments:
//!
//! | Option | Meaning |
//! |---|---|
//! | `--input <dir>` | Directory of original images (required) |
//! | `--output <dir>` | Existing directory results are written to (required) |
//! | `--compare <dir>` | Edited images when generating, diffs when applying (required) |
//! | `--generate` | Produce diffs from originals + edits |
//! | `--apply` | Rebuild edits from originals + diffs |
//!
//! Exactly one of `--generate` / `--apply` must be set. [`Options::validate`]
//! turns the raw flags into an [`Invocation`] or a [`ConfigError`]; nothing
//! touches the filesystem until validation has passed.

use crate::diff::{self, DiffError};
use crate::imaging::Image;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("All three directories (--input, --output, --compare) must be specified")]
    MissingDirectories,
    #[error("Must run in either apply mode (with --apply) or generate mode (with --generate)")]
    AmbiguousMode,
}

/// A pixel transform taking `(original, secondary)` to its result.
pub type Transform = fn(&Image, &Image) -> Result<Image, DiffError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Originals + edits → diffs.
    Generate,
    /// Originals + diffs → edits.
    Apply,
}

impl Mode {
    pub fn transform(self) -> Transform {
        match self {
            Mode::Generate => diff::generate,
            Mode::Apply => diff::apply,
        }
    }

    /// What the `--compare` directory holds in this mode.
    pub fn compare_role(self) -> &'static str {
        match self {
            Mode::Generate => "edits",
            Mode::Apply => "diffs",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Generate => f.write_str("generate"),
            Mode::Apply => f.write_str("apply"),
        }
    }
}

/// Raw option values as parsed from the command line.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub compare: Option<PathBuf>,
    pub generate: bool,
    pub apply: bool,
}

/// A validated run: which transform, and the three directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub mode: Mode,
    /// Originals. Always the primary directory that gets enumerated.
    pub input: PathBuf,
    /// Edits or diffs, depending on `mode`.
    pub compare: PathBuf,
    pub output: PathBuf,
}

impl Options {
    pub fn validate(self) -> Result<Invocation, ConfigError> {
        let (Some(input), Some(output), Some(compare)) = (
            non_empty(self.input),
            non_empty(self.output),
            non_empty(self.compare),
        ) else {
            return Err(ConfigError::MissingDirectories);
        };

        let mode = match (self.generate, self.apply) {
            (true, false) => Mode::Generate,
            (false, true) => Mode::Apply,
            _ => return Err(ConfigError::AmbiguousMode),
        };

        Ok(Invocation {
            mode,
            input,
            compare,
            output,
        })
    }
}

/// An empty path counts as not given.
fn non_empty(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}
