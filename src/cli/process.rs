//! `process` subcommand

use super::args::RunArgs;
use super::utils::build_pipeline;
use anyhow::Result;
use console::style;
use std::path::Path;
use std::time::Instant;

pub fn run(args: &RunArgs, config: Option<&Path>, verbose: bool) -> Result<()> {
    let pipeline = build_pipeline(args, config, verbose)?;
    let started = Instant::now();
    let written = pipeline.process()?;

    if written == 0 {
        eprintln!(
            "{} no notes found under {}",
            style("warning:").yellow().bold(),
            pipeline.paths.target.display()
        );
    }
    println!(
        "processed: {} files, target={} ({:.2?})",
        written,
        pipeline.paths.target.display(),
        started.elapsed()
    );
    Ok(())
}
