//! Configuration loading and merging
//!
//! Handles loading from config files, environment variables, and CLI arguments
//! with proper precedence (CLI > Env > File > Defaults).

pub mod loader;
pub mod merge;

pub use loader::{discover_config, load_config};
pub use merge::{apply_env, merge_cli_with_config, CliOverrides};

use crate::domain::Config;
use anyhow::Result;
use std::path::Path;

/// Resolve the effective configuration for a run.
pub fn resolve_config(
    site_root: &Path,
    config_path: Option<&Path>,
    cli: &CliOverrides,
) -> Result<Config> {
    let file = load_config(site_root, config_path)?;
    let with_env = apply_env(file)?;
    Ok(merge_cli_with_config(with_env, cli))
}
