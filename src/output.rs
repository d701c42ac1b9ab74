//! CLI output formatting for batch runs.
//!
//! # Output Format
//!
//! ```text
//! Processing 001-dawn.png
//! Processing 002-dusk.png
//! Error: 002-dusk.png: Image bounds do not match: (0,0)-(2,2) vs (0,0)-(2,3)
//! Done (generate): 1 written, 1 failed, 3 skipped
//! ```
//!
//! Skipped files (no counterpart in the compare directory) print nothing.
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchStats};
use crate::config::Mode;

/// Lines to print for a single batch event.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Processing { name } => vec![format!("Processing {name}")],
        BatchEvent::Failed { name, error } => vec![format!("Error: {name}: {error}")],
        BatchEvent::Skipped { .. } | BatchEvent::Written { .. } => Vec::new(),
    }
}

pub fn print_batch_event(event: &BatchEvent) {
    for line in format_batch_event(event) {
        println!("{line}");
    }
}

/// Final one-line summary of a run.
pub fn format_summary(mode: Mode, stats: &BatchStats) -> String {
    format!("Done ({mode}): {stats}")
}

pub fn print_summary(mode: Mode, stats: &BatchStats) {
    println!("{}", format_summary(mode, stats));
}
