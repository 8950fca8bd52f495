//! Typed failures raised by the indexing and tagging core.
//!
//! The CLI layer wraps these in `anyhow` context; the core never prints them itself.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetaError {
    /// The version-control executable could not be found on PATH.
    #[error("{tool} command not found; install {tool} and make sure it is on PATH")]
    ToolUnavailable { tool: &'static str },

    /// Strict mode found a note with no usable history.
    #[error("no git history found for {path}")]
    NoHistoryForPath { path: String },

    /// A tag extraction strategy cannot run in this environment.
    #[error("tag extraction strategy '{strategy}' is unavailable: {reason}")]
    ExtractionBackendUnavailable { strategy: &'static str, reason: String },

    /// One unparseable line of `git log` output.
    #[error("malformed history line {line_no}: {line:?}")]
    MalformedHistoryOutput { line_no: usize, line: String },

    #[error("unknown tag extraction strategy '{0}' (expected frequency, graphrank, embedding or none)")]
    UnknownStrategy(String),

    #[error("not a git repository: {}", path.display())]
    NotARepository { path: PathBuf },

    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type MetaResult<T> = std::result::Result<T, MetaError>;
