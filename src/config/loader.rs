//! Config file loading

use crate::domain::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File names probed at the site root, in order.
pub const CONFIG_CANDIDATES: [&str; 6] = [
    "postmeta.toml",
    ".postmeta.toml",
    "postmeta.yml",
    ".postmeta.yml",
    "postmeta.yaml",
    ".postmeta.yaml",
];

/// Nested table name accepted in place of top-level keys.
const SECTION: &str = "postmeta";

/// Load `config_path`, or the first discovered file under `site_root`.
///
/// Errors in an explicitly given file are returned; a broken auto-discovered file only logs a
/// warning and yields defaults.
pub fn load_config(site_root: &Path, config_path: Option<&Path>) -> Result<Config> {
    let explicit = config_path.is_some();

    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(site_root),
    };
    let Some(config_file) = discovered else {
        return Ok(Config::default());
    };

    match parse_config_file(&config_file) {
        Ok(cfg) => {
            tracing::debug!("loaded config from {}", config_file.display());
            Ok(cfg)
        }
        Err(e) if explicit => Err(e),
        Err(e) => {
            tracing::warn!("Failed to parse auto-discovered config {}: {:#}", config_file.display(), e);
            Ok(Config::default())
        }
    }
}

fn parse_config_file(config_file: &Path) -> Result<Config> {
    let content = fs::read_to_string(config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;
    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "toml" => parse_toml_config(&content, config_file),
        "yaml" | "yml" => parse_yaml_config(&content, config_file),
        other => anyhow::bail!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        ),
    }
}

/// Parse TOML config, accepting a nested `[postmeta]` table.
fn parse_toml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;
    let config_val = match raw.get(SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };
    config_val.try_into().with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}

/// Parse YAML config, accepting a nested `postmeta:` mapping.
fn parse_yaml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;
    // An empty file parses as null.
    if raw.is_null() {
        return Ok(Config::default());
    }
    let config_val = match raw.get(SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };
    serde_yaml::from_value(config_val)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}

pub fn discover_config(site_root: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES.iter().map(|name| site_root.join(name)).find(|path| path.is_file())
}
