//! Single-set inspection command handler

use anyhow::{Context, Result};
use gearcat::catalog::GearSet;
use gearcat::{pipeline, CatalogSet, OutputFormat};

use super::apply_source;
use crate::cli::SourceArgs;
use crate::config::Config;

/// Reconcile one set directory and print it to stdout
pub fn handle(
    config: &Config,
    set_dir: &str,
    source: &SourceArgs,
    format: Option<OutputFormat>,
) -> Result<()> {
    let mut pipeline = config.pipeline_config();
    apply_source(&mut pipeline, source);
    let format = format.unwrap_or(pipeline.format);

    let reconciliation = pipeline::reconcile_dir(&pipeline, set_dir)
        .with_context(|| format!("Failed to reconcile set {}", set_dir))?;

    let json = render(&reconciliation.set, format)?;
    println!("{}", json);

    if reconciliation.stat_failures > 0 {
        eprintln!(
            "{} stats left at default, rerun with -v for details",
            reconciliation.stat_failures
        );
    }

    Ok(())
}

fn render(set: &gearcat::EquipmentSet, format: OutputFormat) -> Result<String> {
    let json = match format {
        OutputFormat::Catalog => serde_json::to_string_pretty(&CatalogSet::from(set)),
        OutputFormat::Gear => serde_json::to_string_pretty(&GearSet::from(set)),
    };
    json.context("Failed to serialize set")
}
