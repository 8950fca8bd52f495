//! Per-post assembly: look up dates and tags, rewrite images, pick a cover and write the post back
//! with a generated front matter header.

pub mod cover;
pub mod front_matter;
pub mod images;

pub use cover::default_cover_url;
pub use front_matter::{split_front_matter, strip_front_matter, FrontMatter};
pub use images::{first_image_url, local_image_exists, ImageRewriter};

use crate::domain::{Attribution, AttributionIndex, Config, NoteFile, RawWrapMode, TagAssignments};
use crate::error::MetaError;
use crate::progress::ProgressReporter;
use crate::utils::read_note;
use anyhow::{Context, Result};
use chrono::{FixedOffset, Local};
use std::path::{Path, PathBuf};

const SITE_MARKERS: [&str; 2] = ["package.json", "_config.yml"];

/// Walk up from `start` to the first directory holding both Hexo site markers.
pub fn find_site_root(start: &Path) -> Option<PathBuf> {
    start.ancestors().find(|dir| SITE_MARKERS.iter().all(|m| dir.join(m).exists())).map(Path::to_path_buf)
}

/// Resolved locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePaths {
    pub target: PathBuf,
    pub site_root: PathBuf,
    pub notes: PathBuf,
}

impl SitePaths {
    /// Resolve the site root from `target` (markers, else two levels up as in `source/_posts`) and
    /// default the notes repository to `<site_root>/notes`.
    pub fn resolve(target: &Path, notes: Option<&Path>) -> Self {
        let target = std::path::absolute(target).unwrap_or_else(|_| target.to_path_buf());
        let site_root = find_site_root(&target).unwrap_or_else(|| {
            let fallback = target.parent().and_then(Path::parent).unwrap_or(&target).to_path_buf();
            tracing::debug!("no site markers above {}; using {}", target.display(), fallback.display());
            fallback
        });
        let notes = match notes {
            Some(dir) => std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf()),
            None => site_root.join("notes"),
        };
        Self { target, site_root, notes }
    }
}

/// What to do when a note has no history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPolicy {
    Strict,
    /// Use `fallback` (epoch seconds) for both dates.
    Relaxed { fallback: i64 },
}

impl HistoryPolicy {
    pub fn from_config(config: &Config) -> Self {
        if config.require_git_history {
            HistoryPolicy::Strict
        } else {
            let fallback = config.timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp());
            HistoryPolicy::Relaxed { fallback }
        }
    }

    pub fn resolve(&self, dates: &AttributionIndex, rel_path: &str) -> Result<Attribution, MetaError> {
        match (dates.get(rel_path), self) {
            (Some(entry), _) => Ok(*entry),
            (None, HistoryPolicy::Strict) => {
                Err(MetaError::NoHistoryForPath { path: rel_path.to_string() })
            }
            (None, HistoryPolicy::Relaxed { fallback }) => {
                tracing::warn!("no git history for {}; using fallback time {}", rel_path, fallback);
                Ok(Attribution { created: *fallback, updated: *fallback })
            }
        }
    }
}

/// Turns one note into a finished post.
pub struct PostAssembler {
    site_root: PathBuf,
    rewriter: ImageRewriter,
    raw_wrap: RawWrapMode,
    escape_curly: bool,
    policy: HistoryPolicy,
    /// `None` renders dates in the local time zone.
    utc_offset: Option<FixedOffset>,
}

impl PostAssembler {
    pub fn new(config: &Config, site_root: &Path) -> Self {
        Self {
            site_root: site_root.to_path_buf(),
            rewriter: ImageRewriter::new(&config.image_root_url),
            raw_wrap: config.raw_wrap,
            escape_curly: config.escape_curly,
            policy: HistoryPolicy::from_config(config),
            utc_offset: None,
        }
    }

    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = Some(offset);
        self
    }

    fn format_time(&self, epoch: i64) -> Result<String> {
        let formatted = match &self.utc_offset {
            Some(offset) => front_matter::format_hexo_datetime(epoch, offset),
            None => front_matter::format_hexo_datetime(epoch, &Local),
        };
        formatted.with_context(|| format!("timestamp out of range: {epoch}"))
    }

    /// Build the new file content for `note` from its current text.
    pub fn render(
        &self,
        note: &NoteFile,
        raw: &str,
        dates: &AttributionIndex,
        tags: &TagAssignments,
    ) -> Result<String> {
        let rel = note.relative_path.as_str();
        let body = strip_front_matter(raw.trim_start_matches('\u{feff}'));
        let times = self.policy.resolve(dates, rel)?;

        let body = self.rewriter.rewrite_body(rel, body);
        let cover = match first_image_url(&body) {
            Some(url) if local_image_exists(&self.site_root, &note.path, &url) => url,
            _ => default_cover_url(&self.site_root, rel),
        };

        let title = note
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| rel.to_string());
        let categories = match rel.split_once('/') {
            Some((top, _)) => vec![top.to_string()],
            None => Vec::new(),
        };

        let header = FrontMatter {
            title,
            date: self.format_time(times.created)?,
            updated: self.format_time(times.updated)?,
            cover,
            tags: tags.get(rel).cloned().unwrap_or_default(),
            categories,
        };

        let body = if front_matter::should_raw_wrap(&body, self.raw_wrap) {
            front_matter::wrap_raw(&body)
        } else {
            body
        };
        let content = header.render() + &body;
        Ok(if self.escape_curly { front_matter::escape_curly(&content) } else { content })
    }

    /// Read, render and overwrite one note.
    pub fn process(
        &self,
        note: &NoteFile,
        dates: &AttributionIndex,
        tags: &TagAssignments,
    ) -> Result<()> {
        let raw = read_note(&note.path)?;
        let content = self.render(note, &raw, dates, tags)?;
        std::fs::write(&note.path, content)
            .with_context(|| format!("Failed to write {}", note.path.display()))
    }

    /// Fail before any write when strict mode would reject a note.
    pub fn check_history(&self, notes: &[NoteFile], dates: &AttributionIndex) -> Result<()> {
        if self.policy != HistoryPolicy::Strict {
            return Ok(());
        }
        let missing: Vec<&str> = notes
            .iter()
            .map(|n| n.relative_path.as_str())
            .filter(|rel| !dates.contains_key(*rel))
            .collect();
        let Some(first) = missing.first() else {
            return Ok(());
        };
        Err(MetaError::NoHistoryForPath { path: first.to_string() }).with_context(|| {
            format!("{} of {} notes have no git history; no files were written", missing.len(), notes.len())
        })
    }

    /// Process every note in order; returns the number written.
    pub fn process_all(
        &self,
        notes: &[NoteFile],
        dates: &AttributionIndex,
        tags: &TagAssignments,
        verbose: bool,
    ) -> Result<usize> {
        self.check_history(notes, dates)?;
        let mut progress = ProgressReporter::new(verbose, "[process]");
        let total = notes.len() as u64;
        for (i, note) in notes.iter().enumerate() {
            self.process(note, dates, tags)
                .with_context(|| format!("Failed to process {}", note.relative_path))?;
            progress.update(i as u64 + 1, total);
        }
        progress.finish(total);
        Ok(notes.len())
    }
}
