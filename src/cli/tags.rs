//! `tags` subcommand

use super::args::RunArgs;
use super::utils::build_pipeline;
use anyhow::Result;
use std::path::Path;

pub fn run(args: &RunArgs, config: Option<&Path>, verbose: bool) -> Result<()> {
    let pipeline = build_pipeline(args, config, verbose)?;
    let notes = pipeline.scan()?;
    let state = pipeline.tags(&notes)?;

    eprintln!("[tags] unique={}/{}", state.used().len(), state.max_unique());
    println!("{}", serde_json::to_string_pretty(state.assignments())?);
    Ok(())
}
