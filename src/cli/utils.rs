//! Shared CLI utilities.

use super::args::RunArgs;
use crate::assemble::find_site_root;
use crate::config::resolve_config;
use crate::pipeline::Pipeline;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Parse a comma-separated string into a `Vec<String>`, trimming whitespace and
/// discarding empty segments.  Returns `None` when `value` is `None`.
pub fn parse_csv(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
    })
}

/// Where to look for an auto-discovered config file: the site above the target, else the
/// current directory.
fn config_search_root(target: Option<&Path>) -> PathBuf {
    let target = target.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("source/_posts"));
    let absolute = std::path::absolute(&target).unwrap_or(target);
    find_site_root(&absolute).unwrap_or_else(|| PathBuf::from("."))
}

/// Resolve config layers and site paths for a subcommand.
pub fn build_pipeline(args: &RunArgs, config_path: Option<&Path>, verbose: bool) -> Result<Pipeline> {
    let search_root = config_search_root(args.target.as_deref());
    let config = resolve_config(&search_root, config_path, &args.overrides())?;
    Ok(Pipeline::new(config, verbose))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv() {
        assert_eq!(parse_csv(&None), None);
        assert_eq!(
            parse_csv(&Some(" a/**, ,b ".to_string())),
            Some(vec!["a/**".to_string(), "b".to_string()])
        );
    }
}
