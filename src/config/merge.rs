//! Layering: defaults < config file < `POSTMETA_*` environment < CLI flags.

use crate::domain::{Config, DateKind, RawWrapMode, StrategyKind};
use anyhow::{Context, Result};
use figment::providers::{Env, Serialized};
use figment::Figment;
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "POSTMETA_";

/// Values given on the command line; `None`/`false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub target: Option<PathBuf>,
    pub notes: Option<PathBuf>,
    pub image_root_url: Option<String>,
    pub tag_count: Option<usize>,
    pub tag_budget: Option<usize>,
    pub tag_method: Option<StrategyKind>,
    pub embedding_model: Option<String>,
    pub candidate_limit: Option<usize>,
    pub raw_wrap: Option<RawWrapMode>,
    pub no_escape_curly: bool,
    pub date_kind: Option<DateKind>,
    pub relaxed: bool,
    pub early_stop: bool,
    pub timestamp: Option<i64>,
    pub exclude_globs: Vec<String>,
}

/// Overlay `POSTMETA_*` variables on a file-derived config.
pub fn apply_env(config: Config) -> Result<Config> {
    apply_env_from(config, Env::prefixed(ENV_PREFIX))
}

fn apply_env_from(config: Config, env: Env) -> Result<Config> {
    Figment::from(Serialized::defaults(config))
        .merge(env)
        .extract()
        .context("Invalid POSTMETA_* environment configuration")
}

pub fn merge_cli_with_config(mut config: Config, cli: &CliOverrides) -> Config {
    if let Some(target) = &cli.target {
        config.target = target.clone();
    }
    if let Some(notes) = &cli.notes {
        config.notes = Some(notes.clone());
    }
    if let Some(root) = &cli.image_root_url {
        config.image_root_url = root.clone();
    }
    if let Some(count) = cli.tag_count {
        config.tag_count = count;
    }
    if let Some(budget) = cli.tag_budget {
        config.tag_budget = budget;
    }
    if let Some(method) = cli.tag_method {
        config.tag_method = method;
    }
    if let Some(model) = &cli.embedding_model {
        config.embedding_model = model.clone();
    }
    if cli.candidate_limit.is_some() {
        config.candidate_limit = cli.candidate_limit;
    }
    if let Some(mode) = cli.raw_wrap {
        config.raw_wrap = mode;
    }
    if cli.no_escape_curly {
        config.escape_curly = false;
    }
    if let Some(kind) = cli.date_kind {
        config.date_kind = kind;
    }
    if cli.relaxed {
        config.require_git_history = false;
    }
    if cli.early_stop {
        config.early_stop = true;
    }
    if cli.timestamp.is_some() {
        config.timestamp = cli.timestamp;
    }
    if !cli.exclude_globs.is_empty() {
        config.exclude_globs.extend(cli.exclude_globs.iter().cloned());
    }
    config
}
