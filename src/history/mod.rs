//! Note history: one `git log` pass turned into per-note creation/update times.

pub mod index;
pub mod reader;
pub mod resolver;

pub use index::{build_attribution_index, AttributionIndexBuilder, IndexStats, ScanMode};
pub use reader::{HistoryLog, HistoryQuery, LogStats};
pub use resolver::RenameResolver;

use crate::domain::{AttributionIndex, DateKind};
use crate::error::{MetaError, MetaResult};
use crate::progress::ProgressReporter;
use git2::Repository;
use std::path::{Path, PathBuf};

/// The git repository holding the notes, as found from a directory inside it.
#[derive(Debug, Clone)]
pub struct NotesRepository {
    /// Directory the log is run from; paths in the log are relative to it.
    pub dir: PathBuf,
    pub workdir: PathBuf,
    pub head: Option<String>,
}

/// Locate the repository containing `dir` and describe its HEAD.
pub fn open_notes_repository(dir: &Path) -> MetaResult<NotesRepository> {
    let repo = Repository::discover(dir).map_err(|e| {
        if e.code() == git2::ErrorCode::NotFound {
            MetaError::NotARepository { path: dir.to_path_buf() }
        } else {
            MetaError::Git(e)
        }
    })?;
    let workdir = repo
        .workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| MetaError::NotARepository { path: dir.to_path_buf() })?;

    let head = match repo.head() {
        Ok(reference) => reference.peel_to_commit().ok().map(|commit| {
            let summary = commit.summary().unwrap_or("").to_string();
            format!("{} {}", &commit.id().to_string()[..12], summary)
        }),
        // Unborn branch: a repository without commits simply has no history.
        Err(_) => None,
    };

    Ok(NotesRepository { dir: dir.to_path_buf(), workdir, head })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryReport {
    pub log: LogStats,
    pub index: IndexStats,
    pub interest: usize,
    pub attributed: usize,
}

/// Build the attribution index for `interest` (paths relative to `repo.dir`).
pub fn build_history_index<I, S>(
    repo: &NotesRepository,
    interest: I,
    date_kind: DateKind,
    mode: ScanMode,
    verbose: bool,
) -> MetaResult<(AttributionIndex, HistoryReport)>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut builder = AttributionIndexBuilder::new(interest).mode(mode);
    let mut report = HistoryReport { interest: builder.interest_len(), ..Default::default() };
    if report.interest == 0 {
        return Ok((AttributionIndex::new(), report));
    }

    let mut log = HistoryQuery::new(&repo.dir, date_kind).run()?;
    let total = log.total_bytes();
    let mut progress = ProgressReporter::new(verbose, "[git] scan");

    while let Some(record) = log.next() {
        let keep_going = builder.observe(&record?);
        progress.update(log.bytes_read(), total);
        if !keep_going {
            tracing::debug!("every note has a creation event; history scan stopped early");
            break;
        }
    }
    progress.finish(total);

    report.log = log.stats();
    report.index = builder.stats();
    let index = builder.finish();
    report.attributed = index.len();
    tracing::info!(
        "history: {} records, {} applied, {}/{} notes attributed",
        report.log.records,
        report.index.records_applied,
        report.attributed,
        report.interest
    );
    Ok((index, report))
}
