//! Markdown note discovery

use crate::domain::{NoteFile, ScanStats};
use anyhow::Result;
use std::path::Path;

pub mod scanner;

pub use scanner::{relative_note_path, NoteScanner};

/// Scan `root` for notes, skipping paths matched by `exclude_globs`.
pub fn scan_notes<P: AsRef<Path>>(
    root: P,
    exclude_globs: &[String],
) -> Result<(Vec<NoteFile>, ScanStats)> {
    let mut scanner =
        NoteScanner::new(root.as_ref().to_path_buf()).exclude_globs(exclude_globs.to_vec());
    let notes = scanner.scan()?;
    let stats = scanner.stats().clone();
    Ok((notes, stats))
}
