//! Configuration management for gearcat CLI

use anyhow::{Context, Result};
use gearcat::{AlignmentPolicy, OutputFormat, PipelineConfig, PriorSourceKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Saved defaults. Unset fields fall back to [`PipelineConfig::default`].
#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub root: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub prior: Option<PathBuf>,
    pub alignment: Option<AlignmentPolicy>,
    pub format: Option<OutputFormat>,
    pub prior_source: Option<PriorSourceKind>,
    pub default_level: Option<u32>,
    pub skip_dirs: Option<Vec<String>>,
    /// Set directory -> alignment policy
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub alignment_overrides: BTreeMap<String, AlignmentPolicy>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("gearcat");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing default file yields an empty config; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::config_path()?;
                if !path.exists() {
                    return Ok(Config::default());
                }
                Self::load_from(&path)
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save configuration to `path`, or to the default location
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(path)
    }

    /// Pipeline settings with saved defaults applied
    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default();

        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        config.prior = self.prior.clone();
        if let Some(alignment) = self.alignment {
            config.alignment = alignment;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(kind) = self.prior_source {
            config.prior_source = kind;
        }
        if let Some(level) = self.default_level {
            config.default_level = level;
        }
        if let Some(skip) = &self.skip_dirs {
            config.skip_dirs = skip.clone();
        }
        config.alignment_overrides = self.alignment_overrides.clone();

        config
    }
}
