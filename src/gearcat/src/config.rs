//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::align::AlignmentPolicy;
use crate::catalog::OutputFormat;
use crate::merge::{PriorCatalogSource, RepairingParse, StrictParse};
use crate::{Error, Result};

/// Level assigned to items whose export has no `level`
pub const DEFAULT_LEVEL: u32 = 70;

/// Set directories that never hold a tiered set
pub const DEFAULT_SKIP_DIRS: &[&str] = &["Standalone Equipment"];

/// Which prior catalog parser to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorSourceKind {
    Strict,
    #[default]
    Repair,
}

impl PriorSourceKind {
    pub fn source(&self) -> Box<dyn PriorCatalogSource> {
        match self {
            PriorSourceKind::Strict => Box::new(StrictParse),
            PriorSourceKind::Repair => Box::new(RepairingParse),
        }
    }
}

/// Everything a pipeline run needs to know
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding one subdirectory per equipment set
    pub root: PathBuf,
    /// Output document path
    pub output: PathBuf,
    /// Previously written catalog to take item lists from
    pub prior: Option<PathBuf>,
    pub skip_dirs: Vec<String>,
    pub alignment: AlignmentPolicy,
    /// Set directory -> alignment policy
    pub alignment_overrides: BTreeMap<String, AlignmentPolicy>,
    pub prior_source: PriorSourceKind,
    pub default_level: u32,
    pub format: OutputFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            root: PathBuf::from("."),
            output: PathBuf::from("equipment_sets.json"),
            prior: None,
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
            alignment: AlignmentPolicy::default(),
            alignment_overrides: BTreeMap::new(),
            prior_source: PriorSourceKind::default(),
            default_level: DEFAULT_LEVEL,
            format: OutputFormat::default(),
        }
    }
}

impl PipelineConfig {
    /// Alignment policy for one set directory
    pub fn alignment_for(&self, set_dir: &str) -> AlignmentPolicy {
        self.alignment_overrides
            .get(set_dir)
            .copied()
            .unwrap_or(self.alignment)
    }

    pub fn is_skipped(&self, set_dir: &str) -> bool {
        self.skip_dirs.iter().any(|d| d == set_dir)
    }

    /// Prior catalog path, falling back to the output path
    pub fn prior_path(&self) -> &std::path::Path {
        self.prior.as_deref().unwrap_or(&self.output)
    }

    /// Check the settings a run depends on
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(Error::Config(format!(
                "root {} is not a directory",
                self.root.display()
            )));
        }
        if self.output.as_os_str().is_empty() {
            return Err(Error::Config("output path is empty".to_string()));
        }
        Ok(())
    }
}
