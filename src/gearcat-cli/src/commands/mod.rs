//! Command handlers for gearcat CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod configure;
pub mod effects;
pub mod rebuild;
pub mod show;

use gearcat::{AlignmentPolicy, PipelineConfig};

use crate::cli::SourceArgs;

/// Apply source flags on top of configured defaults
pub fn apply_source(config: &mut PipelineConfig, source: &SourceArgs) {
    if let Some(root) = &source.root {
        config.root = root.clone();
    }
    if let Some(alignment) = source.alignment {
        config.alignment = alignment;
    }
    for dir in &source.positional {
        config
            .alignment_overrides
            .insert(dir.clone(), AlignmentPolicy::Positional);
    }
}
