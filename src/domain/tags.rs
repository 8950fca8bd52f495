use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One note's text as handed to an extraction strategy.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: String,
    pub text: String,
}

impl Document {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self { path: path.into(), text: text.into() }
    }
}

/// A ranked keyword proposed for a document.
#[derive(Debug, Clone, PartialEq)]
pub struct TagCandidate {
    pub document: String,
    pub term: String,
    pub score: f64,
    /// Zero-based position in the document's candidate list.
    pub rank: usize,
}

/// Ranked candidates keyed by relative path; iteration order is the allocation order.
pub type CandidateIndex = BTreeMap<String, Vec<TagCandidate>>;

/// Final tags keyed by relative path, each list in selection order.
pub type TagAssignments = BTreeMap<String, Vec<String>>;

/// Which keyword ranking algorithm feeds the allocator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Corpus-wide TF-IDF
    #[default]
    #[serde(alias = "tfidf")]
    #[value(alias = "tfidf")]
    Frequency,
    /// Per-document TextRank over token co-occurrence
    #[serde(alias = "textrank")]
    #[value(alias = "textrank")]
    Graphrank,
    /// Per-document embedding similarity
    #[serde(alias = "keybert")]
    #[value(alias = "keybert")]
    Embedding,
    /// Disable tagging
    #[serde(alias = "off")]
    #[value(alias = "off")]
    None,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Frequency => "frequency",
            StrategyKind::Graphrank => "graphrank",
            StrategyKind::Embedding => "embedding",
            StrategyKind::None => "none",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = crate::error::MetaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "frequency" | "tfidf" => Ok(StrategyKind::Frequency),
            "graphrank" | "textrank" => Ok(StrategyKind::Graphrank),
            "embedding" | "keybert" => Ok(StrategyKind::Embedding),
            "none" | "off" | "false" | "0" => Ok(StrategyKind::None),
            other => Err(crate::error::MetaError::UnknownStrategy(other.to_string())),
        }
    }
}
