//! Set effect refresh command handler
//!
//! Takes set-effect text from the Base tier exports and item lists from a
//! previously written catalog.

use anyhow::{Context, Result};
use gearcat::pipeline;
use gearcat::{PipelineConfig, PriorSourceKind};
use std::path::PathBuf;

use crate::config::Config;

/// Handle the effects command
pub fn handle(
    config: &Config,
    root: Option<PathBuf>,
    prior: Option<PathBuf>,
    output: Option<PathBuf>,
    strict: bool,
) -> Result<()> {
    let pipeline = resolve(config, root, prior, output, strict);

    let summary = pipeline::refresh_effects(&pipeline).with_context(|| {
        format!(
            "Failed to refresh set effects from {}",
            pipeline.root.display()
        )
    })?;

    println!();
    println!(
        "✓ Saved {} sets to {}",
        summary.sets_updated + summary.sets_created,
        pipeline.output.display()
    );
    println!("  Updated: {}", summary.sets_updated);
    println!("  Created: {}", summary.sets_created);
    if summary.prior_sets == 0 {
        println!("  No prior item lists were available");
    }

    Ok(())
}

fn resolve(
    config: &Config,
    root: Option<PathBuf>,
    prior: Option<PathBuf>,
    output: Option<PathBuf>,
    strict: bool,
) -> PipelineConfig {
    let mut pipeline = config.pipeline_config();
    if let Some(root) = root {
        pipeline.root = root;
    }
    if let Some(prior) = prior {
        pipeline.prior = Some(prior);
    }
    if let Some(output) = output {
        pipeline.output = output;
    }
    if strict {
        pipeline.prior_source = PriorSourceKind::Strict;
    }
    pipeline
}
