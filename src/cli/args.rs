//! Flags shared by every subcommand.

use super::utils::parse_csv;
use crate::config::CliOverrides;
use crate::domain::{DateKind, RawWrapMode, StrategyKind};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Directory of Markdown posts to process [default: source/_posts]
    #[arg(short, long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Git repository holding the original notes [default: <site_root>/notes]
    #[arg(long, value_name = "DIR")]
    pub notes: Option<PathBuf>,

    /// Which git timestamp to use for dates
    #[arg(long = "git-date", value_enum, ignore_case = true, value_name = "KIND")]
    pub git_date: Option<DateKind>,

    /// Tags per post
    #[arg(long, value_name = "N")]
    pub tag_count: Option<usize>,

    /// Maximum number of distinct tags across all posts
    #[arg(long, value_name = "N")]
    pub tag_budget: Option<usize>,

    /// Keyword extraction strategy
    #[arg(long, value_enum, ignore_case = true, value_name = "METHOD")]
    pub tag_method: Option<StrategyKind>,

    /// Model for the embedding strategy
    #[arg(long, value_name = "NAME")]
    pub embedding_model: Option<String>,

    /// Candidates considered per post [default: max(30, 10 * tag-count)]
    #[arg(long, value_name = "N")]
    pub candidate_limit: Option<usize>,

    /// Use the fallback time instead of failing when a post has no git history
    #[arg(long)]
    pub relaxed: bool,

    /// Stop reading history once every post has a creation event
    #[arg(long)]
    pub early_stop: bool,

    /// Fallback timestamp (epoch seconds) for posts without history [default: now]
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub timestamp: Option<i64>,

    /// Wrap post bodies in {% raw %}
    #[arg(long, value_enum, ignore_case = true, value_name = "MODE")]
    pub raw_wrap: Option<RawWrapMode>,

    /// Leave {{ and }} unescaped
    #[arg(long)]
    pub no_escape_curly: bool,

    /// URL prefix for rewritten relative image links [default: /note_image]
    #[arg(long = "image-root", value_name = "URL")]
    pub image_root: Option<String>,

    /// Exclude posts matching these globs (comma-separated)
    #[arg(short = 'e', long, value_name = "GLOBS")]
    pub exclude_glob: Option<String>,
}

impl RunArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            target: self.target.clone(),
            notes: self.notes.clone(),
            image_root_url: self.image_root.clone(),
            tag_count: self.tag_count,
            tag_budget: self.tag_budget,
            tag_method: self.tag_method,
            embedding_model: self.embedding_model.clone(),
            candidate_limit: self.candidate_limit,
            raw_wrap: self.raw_wrap,
            no_escape_curly: self.no_escape_curly,
            date_kind: self.git_date,
            relaxed: self.relaxed,
            early_stop: self.early_stop,
            timestamp: self.timestamp,
            exclude_globs: parse_csv(&self.exclude_glob).unwrap_or_default(),
        }
    }
}
