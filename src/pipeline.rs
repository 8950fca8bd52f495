//! The stages behind each subcommand: scan, attribute dates, allocate tags, assemble posts.

use crate::assemble::{PostAssembler, SitePaths};
use crate::domain::{AttributionIndex, Config, Document, NoteFile};
use crate::error::MetaError;
use crate::history::{build_history_index, open_notes_repository, ScanMode};
use crate::scan::scan_notes;
use crate::tags::{allocate_tags, build_extractor, ExtractOptions, GlobalTagState};
use crate::utils::read_note;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::time::Instant;

/// A resolved configuration plus the directories it points at.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub config: Config,
    pub paths: SitePaths,
    pub verbose: bool,
}

impl Pipeline {
    pub fn new(config: Config, verbose: bool) -> Self {
        let paths = SitePaths::resolve(&config.target, config.notes.as_deref());
        tracing::debug!(
            "target={} site_root={} notes={}",
            paths.target.display(),
            paths.site_root.display(),
            paths.notes.display()
        );
        Self { config, paths, verbose }
    }

    pub fn scan(&self) -> Result<Vec<NoteFile>> {
        let (notes, stats) = scan_notes(&self.paths.target, &self.config.exclude_globs)?;
        tracing::info!(
            "scan: {} notes ({} files seen, {} excluded)",
            notes.len(),
            stats.files_scanned,
            stats.files_skipped_glob
        );
        Ok(notes)
    }

    /// Creation/update times for `notes` from one pass over the notes repository history.
    pub fn dates(&self, notes: &[NoteFile]) -> Result<AttributionIndex> {
        if notes.is_empty() {
            return Ok(AttributionIndex::new());
        }
        if !self.paths.notes.is_dir() {
            tracing::warn!(
                "notes repository not found: {} (sync it first or pass --notes); no history available",
                self.paths.notes.display()
            );
            return Ok(AttributionIndex::new());
        }
        let repo = match open_notes_repository(&self.paths.notes) {
            Ok(repo) => repo,
            Err(MetaError::NotARepository { path }) => {
                tracing::warn!("not a git repository: {}; no history available", path.display());
                return Ok(AttributionIndex::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to open notes repository {}", self.paths.notes.display())
                })
            }
        };
        if let Some(head) = &repo.head {
            tracing::debug!("notes HEAD: {}", head);
        }

        let mode = if self.config.early_stop { ScanMode::StopWhenAllAdded } else { ScanMode::Full };
        let started = Instant::now();
        let (index, report) = build_history_index(
            &repo,
            notes.iter().map(|n| n.relative_path.clone()),
            self.config.date_kind,
            mode,
            self.verbose,
        )?;
        tracing::info!(
            "[git] batch index: filled={}/{} in {:.2?}{}",
            report.attributed,
            report.interest,
            started.elapsed(),
            if report.index.stopped_early { " (stopped early)" } else { "" }
        );
        if report.log.malformed > 0 {
            tracing::warn!("skipped {} malformed git log lines", report.log.malformed);
        }
        Ok(index)
    }

    /// Tags for `notes` under the configured per-document count and corpus budget.
    pub fn tags(&self, notes: &[NoteFile]) -> Result<GlobalTagState> {
        let cfg = &self.config;
        if cfg.tag_count == 0 || notes.is_empty() {
            return Ok(GlobalTagState::new(cfg.tag_budget));
        }
        let options = ExtractOptions {
            candidate_limit: cfg.effective_candidate_limit(),
            embedding_model: cfg.embedding_model.clone(),
        };
        let extractor = build_extractor(cfg.tag_method, &options)?;

        let corpus = notes
            .par_iter()
            .map(|note| read_note(&note.path).map(|text| Document::new(&note.relative_path, text)))
            .collect::<Result<Vec<_>>>()?;

        let started = Instant::now();
        let candidates = extractor.extract(&corpus)?;
        tracing::info!("[tags {}] extracted candidates in {:.2?}", extractor.name(), started.elapsed());

        Ok(allocate_tags(&candidates, cfg.tag_count, cfg.tag_budget))
    }

    /// Run every stage and rewrite the posts in place. Returns the number of files written.
    pub fn process(&self) -> Result<usize> {
        let notes = self.scan()?;
        if notes.is_empty() {
            return Ok(0);
        }
        let dates = self.dates(&notes)?;
        let tags = self.tags(&notes)?;
        let assembler = PostAssembler::new(&self.config, &self.paths.site_root);
        assembler.process_all(&notes, &dates, tags.assignments(), self.verbose)
    }
}
