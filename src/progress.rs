//! Progress reporting for long-running stages.
//!
//! Interactive terminals get a single in-place progress bar on stderr. Batch consumers (CI, cron,
//! piped output) get one `info` log line every time the integer percentage changes.

use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub struct ProgressReporter {
    enabled: bool,
    prefix: String,
    bar: Option<ProgressBar>,
    last_pct: Option<u64>,
    lines_emitted: usize,
}

impl ProgressReporter {
    /// Create a reporter, picking the bar or log mode from whether stderr is a terminal.
    pub fn new(enabled: bool, prefix: impl Into<String>) -> Self {
        let interactive = Term::stderr().features().is_attended();
        Self::with_mode(enabled, prefix, interactive)
    }

    pub fn with_mode(enabled: bool, prefix: impl Into<String>, interactive: bool) -> Self {
        let prefix = prefix.into();
        let bar = (enabled && interactive).then(|| {
            let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
            let style = ProgressStyle::with_template("{prefix} [{bar:24}] {pos}/{len} {percent:>3}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#-");
            bar.set_style(style);
            bar.set_prefix(prefix.clone());
            bar
        });
        Self { enabled, prefix, bar, last_pct: None, lines_emitted: 0 }
    }

    pub fn update(&mut self, done: u64, total: u64) {
        if !self.enabled {
            return;
        }
        let done = if total > 0 { done.min(total) } else { done };

        if let Some(bar) = &self.bar {
            bar.set_length(total);
            bar.set_position(done);
            return;
        }

        let pct = done * 100 / total.max(1);
        if self.last_pct != Some(pct) {
            tracing::info!("{}: {}% ({}/{})", self.prefix, pct, done, total);
            self.last_pct = Some(pct);
            self.lines_emitted += 1;
        }
    }

    /// Mark the stage complete, even when it stopped early.
    pub fn finish(&mut self, total: u64) {
        if !self.enabled {
            return;
        }
        self.update(total, total);
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }

    /// Number of batch log lines written so far.
    pub fn lines_emitted(&self) -> usize {
        self.lines_emitted
    }
}
