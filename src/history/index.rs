//! Creation/update attribution built from one newest-first pass over history.

use super::resolver::RenameResolver;
use crate::domain::{Attribution, AttributionIndex, Change, ChangeRecord};
use crate::error::MetaResult;
use std::collections::{HashMap, HashSet};

/// Whether the pass may stop before the end of history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Read every record. Always correct.
    #[default]
    Full,
    /// Stop once every interest path has been attributed an `Added` event.
    ///
    /// A note that was deleted and re-created further back in history can end up with a
    /// `created` time that is too recent in this mode.
    StopWhenAllAdded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub records_read: usize,
    pub records_applied: usize,
    pub stopped_early: bool,
}

/// Folds [`ChangeRecord`]s (newest first) into an [`AttributionIndex`].
///
/// `updated` is set the first time a path is seen and never touched again; `created` is
/// overwritten by every older sighting, so it settles on the oldest timestamp of the path's
/// whole alias chain.
pub struct AttributionIndexBuilder {
    interest: HashSet<String>,
    resolver: RenameResolver,
    created: HashMap<String, i64>,
    updated: HashMap<String, i64>,
    added: HashSet<String>,
    mode: ScanMode,
    stats: IndexStats,
}

impl AttributionIndexBuilder {
    pub fn new<I, S>(interest: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            interest: interest.into_iter().map(Into::into).collect(),
            resolver: RenameResolver::new(),
            created: HashMap::new(),
            updated: HashMap::new(),
            added: HashSet::new(),
            mode: ScanMode::Full,
            stats: IndexStats::default(),
        }
    }

    pub fn mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    /// Apply one record. Returns `false` once the builder needs no further history.
    pub fn observe(&mut self, record: &ChangeRecord) -> bool {
        self.stats.records_read += 1;
        let ts = record.timestamp;

        let target = match &record.change {
            Change::Renamed { from, to } => {
                let interest = &self.interest;
                self.resolver.record_rename(from, to, |p| interest.contains(p))
            }
            Change::Added(path) | Change::Modified(path) | Change::Deleted(path) => {
                let resolved = self.resolver.resolve(path);
                self.interest.contains(&resolved).then_some(resolved)
            }
        };

        if let Some(target) = target {
            self.stats.records_applied += 1;
            tracing::trace!("attribute {} to {}", record, target);
            if matches!(record.change, Change::Added(_)) {
                self.added.insert(target.clone());
            }
            self.updated.entry(target.clone()).or_insert(ts);
            self.created.insert(target, ts);
        }

        if self.mode == ScanMode::StopWhenAllAdded && self.all_added() {
            self.stats.stopped_early = true;
            return false;
        }
        true
    }

    fn all_added(&self) -> bool {
        !self.interest.is_empty() && self.added.len() == self.interest.len()
    }

    /// Consume records until the source is exhausted or early stop triggers.
    pub fn consume<I>(&mut self, records: I) -> MetaResult<()>
    where
        I: IntoIterator<Item = MetaResult<ChangeRecord>>,
    {
        self.consume_with(records, |_| {})
    }

    /// Like [`consume`](Self::consume), calling `on_record` after each record is applied.
    pub fn consume_with<I, F>(&mut self, records: I, mut on_record: F) -> MetaResult<()>
    where
        I: IntoIterator<Item = MetaResult<ChangeRecord>>,
        F: FnMut(&IndexStats),
    {
        if self.interest.is_empty() {
            return Ok(());
        }
        for record in records {
            let keep_going = self.observe(&record?);
            on_record(&self.stats);
            if !keep_going {
                tracing::debug!(
                    "every note has a creation event; stopping after {} records",
                    self.stats.records_read
                );
                break;
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> IndexStats {
        self.stats
    }

    pub fn interest_len(&self) -> usize {
        self.interest.len()
    }

    /// Entries for every interest path that was seen at least once.
    pub fn finish(self) -> AttributionIndex {
        let mut index = AttributionIndex::new();
        for path in &self.interest {
            let (Some(&created), Some(&updated)) = (self.created.get(path), self.updated.get(path))
            else {
                continue;
            };
            // Author dates are not monotonic in log order; keep created <= updated regardless.
            let entry = if created <= updated {
                Attribution { created, updated }
            } else {
                Attribution { created: updated, updated: created }
            };
            index.insert(path.clone(), entry);
        }
        index
    }
}

/// Build an index from an in-memory or streamed record source in one call.
pub fn build_attribution_index<I, S, R>(
    interest: I,
    records: R,
    mode: ScanMode,
) -> MetaResult<(AttributionIndex, IndexStats)>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    R: IntoIterator<Item = MetaResult<ChangeRecord>>,
{
    let mut builder = AttributionIndexBuilder::new(interest).mode(mode);
    builder.consume(records)?;
    let stats = builder.stats();
    Ok((builder.finish(), stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn added(ts: i64, p: &str) -> MetaResult<ChangeRecord> {
        Ok(ChangeRecord::new(ts, Change::Added(p.to_string())))
    }
    fn modified(ts: i64, p: &str) -> MetaResult<ChangeRecord> {
        Ok(ChangeRecord::new(ts, Change::Modified(p.to_string())))
    }
    fn deleted(ts: i64, p: &str) -> MetaResult<ChangeRecord> {
        Ok(ChangeRecord::new(ts, Change::Deleted(p.to_string())))
    }
    fn renamed(ts: i64, from: &str, to: &str) -> MetaResult<ChangeRecord> {
        Ok(ChangeRecord::new(ts, Change::Renamed { from: from.to_string(), to: to.to_string() }))
    }

    fn build(interest: &[&str], records: Vec<MetaResult<ChangeRecord>>) -> AttributionIndex {
        build_attribution_index(interest.iter().copied(), records, ScanMode::Full)
            .expect("build")
            .0
    }

    #[test]
    fn without_renames_created_is_oldest_and_updated_is_newest() {
        let index = build(
            &["a.md", "b.md"],
            vec![
                modified(500, "a.md"),
                modified(400, "b.md"),
                modified(300, "a.md"),
                added(200, "b.md"),
                added(100, "a.md"),
            ],
        );
        assert_eq!(index["a.md"], Attribution { created: 100, updated: 500 });
        assert_eq!(index["b.md"], Attribution { created: 200, updated: 400 });
    }

    #[test]
    fn rename_attributes_old_history_to_current_path() {
        let index = build(
            &["b.md"],
            vec![added(300, "b.md"), renamed(200, "a.md", "b.md"), added(100, "a.md")],
        );
        assert_eq!(index["b.md"], Attribution { created: 100, updated: 300 });
    }

    #[test]
    fn rename_chain_follows_every_hop() {
        let index = build(
            &["b.md"],
            vec![
                modified(400, "b.md"),
                renamed(300, "a.md", "b.md"),
                modified(250, "a.md"),
                renamed(200, "x.md", "a.md"),
                added(100, "x.md"),
            ],
        );
        assert_eq!(index["b.md"], Attribution { created: 100, updated: 400 });
    }

    #[test]
    fn rename_as_newest_event_sets_updated() {
        let index = build(&["new.md"], vec![renamed(90, "old.md", "new.md"), added(10, "old.md")]);
        assert_eq!(index["new.md"], Attribution { created: 10, updated: 90 });
    }

    #[test]
    fn unrelated_and_untouched_paths_are_absent() {
        let index = build(&["a.md", "never.md"], vec![added(10, "a.md"), added(5, "other.md")]);
        assert!(index.contains_key("a.md"));
        assert!(!index.contains_key("never.md"));
        assert!(!index.contains_key("other.md"));
    }

    #[test]
    fn deleted_history_of_a_reused_name_counts_toward_the_current_file() {
        // a.md deleted at 200 and re-added at 300: the full scan keeps the original creation.
        let index = build(
            &["a.md"],
            vec![added(300, "a.md"), deleted(200, "a.md"), added(100, "a.md")],
        );
        assert_eq!(index["a.md"], Attribution { created: 100, updated: 300 });
    }

    #[test]
    fn early_stop_is_opt_in_and_documents_its_caveat() {
        let records =
            || vec![added(300, "a.md"), deleted(200, "a.md"), added(100, "a.md"), added(50, "z")];

        let (full, stats) =
            build_attribution_index(["a.md"], records(), ScanMode::Full).expect("full");
        assert_eq!(full["a.md"].created, 100);
        assert!(!stats.stopped_early);
        assert_eq!(stats.records_read, 4);

        let (fast, stats) =
            build_attribution_index(["a.md"], records(), ScanMode::StopWhenAllAdded).expect("fast");
        assert!(stats.stopped_early);
        assert_eq!(stats.records_read, 1);
        // The re-creation at 300 is mistaken for the original creation.
        assert_eq!(fast["a.md"], Attribution { created: 300, updated: 300 });
    }

    #[test]
    fn out_of_order_timestamps_keep_created_before_updated() {
        let index = build(&["a.md"], vec![modified(100, "a.md"), added(200, "a.md")]);
        let entry = index["a.md"];
        assert!(entry.created <= entry.updated);
        assert_eq!(entry, Attribution { created: 100, updated: 200 });
    }

    #[test]
    fn empty_interest_reads_nothing() {
        let (index, stats) =
            build_attribution_index(Vec::<String>::new(), vec![added(1, "a.md")], ScanMode::Full)
                .expect("build");
        assert!(index.is_empty());
        assert_eq!(stats.records_read, 0);
    }

    #[test]
    fn io_errors_propagate() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        let result =
            build_attribution_index(["a.md"], vec![added(1, "a.md"), Err(err.into())], ScanMode::Full);
        assert!(result.is_err());
    }
}
