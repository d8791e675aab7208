//! Catalog rebuild command handler

use anyhow::{Context, Result};
use gearcat::pipeline::{self, RebuildSummary};
use gearcat::{OutputFormat, PipelineConfig};
use std::path::PathBuf;

use super::apply_source;
use crate::cli::SourceArgs;
use crate::config::Config;

/// Handle the rebuild command
pub fn handle(
    config: &Config,
    source: &SourceArgs,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
) -> Result<()> {
    let pipeline = resolve(config, source, output, format);
    let summary = run(&pipeline)?;
    print_summary(&pipeline, &summary);
    Ok(())
}

fn resolve(
    config: &Config,
    source: &SourceArgs,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
) -> PipelineConfig {
    let mut pipeline = config.pipeline_config();
    apply_source(&mut pipeline, source);
    if let Some(output) = output {
        pipeline.output = output;
    }
    if let Some(format) = format {
        pipeline.format = format;
    }
    pipeline
}

fn run(pipeline: &PipelineConfig) -> Result<RebuildSummary> {
    pipeline::rebuild(pipeline).with_context(|| {
        format!(
            "Failed to rebuild catalog from {}",
            pipeline.root.display()
        )
    })
}

fn print_summary(pipeline: &PipelineConfig, summary: &RebuildSummary) {
    println!();
    println!(
        "✓ Wrote {} sets ({} items) to {} [{}]",
        summary.sets_written,
        summary.items_written,
        pipeline.output.display(),
        pipeline.format
    );
    if summary.sets_skipped > 0 {
        println!("  Skipped sets: {}", summary.sets_skipped);
    }
    if summary.stat_failures > 0 {
        println!("  Stats left at default: {}", summary.stat_failures);
    }
}
