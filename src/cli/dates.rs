//! `dates` subcommand

use super::args::RunArgs;
use super::utils::build_pipeline;
use anyhow::Result;
use std::path::Path;

pub fn run(args: &RunArgs, config: Option<&Path>, verbose: bool) -> Result<()> {
    let pipeline = build_pipeline(args, config, verbose)?;
    let notes = pipeline.scan()?;
    let index = pipeline.dates(&notes)?;

    let missing = notes.iter().filter(|n| !index.contains_key(&n.relative_path)).count();
    if missing > 0 {
        tracing::warn!("{} of {} notes have no history", missing, notes.len());
    }
    println!("{}", serde_json::to_string_pretty(&index)?);
    Ok(())
}
