//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up gearcat CLI defaults.

use crate::config::Config;
use anyhow::Result;
use gearcat::AlignmentPolicy;
use std::path::{Path, PathBuf};

/// Values the configure command can set
#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub root: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub prior: Option<PathBuf>,
    pub alignment: Option<AlignmentPolicy>,
}

impl ConfigUpdate {
    fn is_empty(&self) -> bool {
        self.root.is_none()
            && self.output.is_none()
            && self.prior.is_none()
            && self.alignment.is_none()
    }

    fn apply(self, config: &mut Config) {
        if let Some(root) = self.root {
            config.root = Some(root);
        }
        if let Some(output) = self.output {
            config.output = Some(output);
        }
        if let Some(prior) = self.prior {
            config.prior = Some(prior);
        }
        if let Some(alignment) = self.alignment {
            config.alignment = Some(alignment);
        }
    }
}

/// Handle the configure command
///
/// # Arguments
/// * `path` - Explicit config file, or `None` for the default location
/// * `update` - Values to store
/// * `show` - If true, show current configuration
pub fn handle(path: Option<&Path>, update: ConfigUpdate, show: bool) -> Result<()> {
    // A new explicit config file may not exist yet
    let mut config = match path {
        Some(p) if !p.exists() => Config::default(),
        _ => Config::load(path)?,
    };

    if show {
        show_config(&config, path);
        return Ok(());
    }

    if update.is_empty() {
        show_usage();
        return Ok(());
    }

    update.apply(&mut config);
    let saved = config.save(path)?;
    println!("Config saved to: {}", saved.display());

    Ok(())
}

/// Display current configuration
fn show_config(config: &Config, path: Option<&Path>) {
    let pipeline = config.pipeline_config();

    println!("Root: {}", pipeline.root.display());
    println!("Output: {} [{}]", pipeline.output.display(), pipeline.format);
    println!("Prior catalog: {}", pipeline.prior_path().display());
    println!("Alignment: {}", pipeline.alignment);
    for (dir, policy) in &pipeline.alignment_overrides {
        println!("  {}: {}", dir, policy);
    }

    let file = path.map(Path::to_path_buf).or_else(|| Config::config_path().ok());
    if let Some(file) = file {
        println!("Config file: {}", file.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: gearcat configure --root DIR [--output FILE] [--prior FILE]");
    println!("   or: gearcat configure --alignment positional");
    println!("   or: gearcat configure --show");
}
