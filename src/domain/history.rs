use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which git timestamp a history query reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DateKind {
    #[default]
    Author,
    Committer,
}

impl DateKind {
    /// The `git log --format` placeholder for this date kind.
    pub fn format_placeholder(self) -> &'static str {
        match self {
            DateKind::Author => "%at",
            DateKind::Committer => "%ct",
        }
    }
}

impl FromStr for DateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "author" => Ok(DateKind::Author),
            "committer" => Ok(DateKind::Committer),
            other => Err(format!("invalid date kind '{other}' (expected author or committer)")),
        }
    }
}

/// The path-level effect of one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Added(String),
    Modified(String),
    Deleted(String),
    Renamed { from: String, to: String },
}

impl Change {
    /// The path this change leaves behind (the new name for renames).
    pub fn path(&self) -> &str {
        match self {
            Change::Added(p) | Change::Modified(p) | Change::Deleted(p) => p,
            Change::Renamed { to, .. } => to,
        }
    }
}

/// One historical event for one path, as read from `git log --name-status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub timestamp: i64,
    pub change: Change,
}

impl ChangeRecord {
    pub fn new(timestamp: i64, change: Change) -> Self {
        Self { timestamp, change }
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.change {
            Change::Added(p) => write!(f, "{} A {}", self.timestamp, p),
            Change::Modified(p) => write!(f, "{} M {}", self.timestamp, p),
            Change::Deleted(p) => write!(f, "{} D {}", self.timestamp, p),
            Change::Renamed { from, to } => write!(f, "{} R {} -> {}", self.timestamp, from, to),
        }
    }
}

/// Creation and last-modification time of one note, in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attribution {
    pub created: i64,
    pub updated: i64,
}

/// Attribution results keyed by current relative path.
pub type AttributionIndex = BTreeMap<String, Attribution>;
