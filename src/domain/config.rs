use super::{DateKind, StrategyKind};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// When to wrap a post body in a `{% raw %}` block.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RawWrapMode {
    /// Only when the body contains template markers
    #[default]
    Auto,
    Always,
    Never,
}

impl FromStr for RawWrapMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(RawWrapMode::Auto),
            "always" => Ok(RawWrapMode::Always),
            "never" => Ok(RawWrapMode::Never),
            other => Err(format!("invalid raw wrap mode '{other}' (expected auto, always or never)")),
        }
    }
}

/// Effective run configuration (defaults < config file < environment < CLI).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: PathBuf,
    pub notes: Option<PathBuf>,
    pub image_root_url: String,
    pub tag_count: usize,
    pub tag_budget: usize,
    #[serde(deserialize_with = "parse_from_str")]
    pub tag_method: StrategyKind,
    pub embedding_model: String,
    pub candidate_limit: Option<usize>,
    #[serde(deserialize_with = "parse_from_str")]
    pub raw_wrap: RawWrapMode,
    pub escape_curly: bool,
    #[serde(deserialize_with = "parse_from_str")]
    pub date_kind: DateKind,
    pub require_git_history: bool,
    pub early_stop: bool,
    pub timestamp: Option<i64>,
    #[serde(deserialize_with = "string_or_list")]
    pub exclude_globs: Vec<String>,
}

pub const DEFAULT_EMBEDDING_MODEL: &str = "hashed-ngram";

impl Default for Config {
    fn default() -> Self {
        Self {
            target: PathBuf::from("source/_posts"),
            notes: None,
            image_root_url: "/note_image".to_string(),
            tag_count: 3,
            tag_budget: 100,
            tag_method: StrategyKind::Frequency,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            candidate_limit: None,
            raw_wrap: RawWrapMode::Auto,
            escape_curly: true,
            date_kind: DateKind::Author,
            require_git_history: true,
            early_stop: false,
            timestamp: None,
            exclude_globs: Vec::new(),
        }
    }
}

impl Config {
    /// Candidate list length handed from a strategy to the allocator.
    pub fn effective_candidate_limit(&self) -> usize {
        self.candidate_limit.unwrap_or_else(|| (self.tag_count * 10).max(30))
    }
}

/// Enum-valued options are matched case-insensitively through their `FromStr` impls.
///
/// Environment values arrive pre-typed (`0`, `false`), so bare scalars are accepted too.
fn parse_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Str(String),
        Bool(bool),
        Int(i64),
    }

    let raw = match Scalar::deserialize(deserializer)? {
        Scalar::Str(s) => s,
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(i) => i.to_string(),
    };
    raw.parse().map_err(serde::de::Error::custom)
}

/// Accept either a list or a comma-separated string; entries are trimmed and blanks dropped.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    let items = match StringOrList::deserialize(deserializer)? {
        StringOrList::One(s) => s.split(',').map(str::to_string).collect(),
        StringOrList::Many(v) => v,
    };
    Ok(items.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_options_are_case_insensitive() {
        let cfg: Config =
            toml::from_str("tag_method = 'TextRank'\nraw_wrap = 'NEVER'\ndate_kind = 'Committer'\n")
                .unwrap();
        assert_eq!(cfg.tag_method, StrategyKind::Graphrank);
        assert_eq!(cfg.raw_wrap, RawWrapMode::Never);
        assert_eq!(cfg.date_kind, DateKind::Committer);
        assert!(toml::from_str::<Config>("tag_method = 'lda'\n").is_err());
        let cfg: Config = toml::from_str("tag_method = false\n").unwrap();
        assert_eq!(cfg.tag_method, StrategyKind::None);
    }

    #[test]
    fn test_exclude_globs_accepts_string_or_list() {
        let cfg: Config = toml::from_str("exclude_globs = 'drafts/**, , private/*'\n").unwrap();
        assert_eq!(cfg.exclude_globs, vec!["drafts/**", "private/*"]);
        let cfg: Config = toml::from_str("exclude_globs = [' a ', 'b']\n").unwrap();
        assert_eq!(cfg.exclude_globs, vec!["a", "b"]);
        assert!(toml::from_str::<Config>("exclude_globs = false\n").is_err());
    }

    #[test]
    fn test_candidate_limit_default_scales_with_tag_count() {
        let mut cfg = Config::default();
        assert_eq!(cfg.effective_candidate_limit(), 30);
        cfg.tag_count = 5;
        assert_eq!(cfg.effective_candidate_limit(), 50);
        cfg.candidate_limit = Some(7);
        assert_eq!(cfg.effective_candidate_limit(), 7);
    }
}
