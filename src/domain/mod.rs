//! Shared data model for the indexing, tagging and assembly stages.

mod config;
mod history;
mod notes;
mod tags;

pub use config::{Config, RawWrapMode, DEFAULT_EMBEDDING_MODEL};
pub use history::{Attribution, AttributionIndex, Change, ChangeRecord, DateKind};
pub use notes::{NoteFile, ScanStats};
pub use tags::{CandidateIndex, Document, StrategyKind, TagAssignments, TagCandidate};

/// File extensions treated as Markdown notes.
pub const NOTE_EXTENSIONS: &[&str] = &[".md", ".markdown"];

/// Returns true when `path` ends with one of [`NOTE_EXTENSIONS`] (case-insensitive).
pub fn is_note_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    NOTE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
