//! # gearcat
//!
//! Equipment set catalog library - reconciles per-tier stat exports into a
//! single normalized catalog.
//!
//! This library provides functionality to:
//! - Parse string-encoded stat values (`"120"`, `"7.5%"`)
//! - Compute per-tier stat deltas against the Base tier
//! - Load tier documents (`Base`, `+1`, `+2`, `+3`) for each equipment set
//! - Align items across tiers by identifier or by position
//! - Merge fresh set-effect text with item lists from a prior catalog
//!
//! ## Example
//!
//! ```no_run
//! use gearcat::{pipeline, PipelineConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig {
//!     root: "Equipment/Lv70".into(),
//!     output: "equipment_sets.json".into(),
//!     ..PipelineConfig::default()
//! };
//!
//! let summary = pipeline::rebuild(&config)?;
//! println!("{} sets written, {} skipped", summary.sets_written, summary.sets_skipped);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

pub mod align;
pub mod catalog;
pub mod config;
pub mod delta;
pub mod merge;
pub mod pipeline;
pub mod reconcile;
pub mod tier;
pub mod value;

#[doc(inline)]
pub use align::AlignmentPolicy;
#[doc(inline)]
pub use catalog::{Catalog, CatalogItem, CatalogSet, GearDocument, OutputFormat};
#[doc(inline)]
pub use config::{PipelineConfig, PriorSourceKind};
#[doc(inline)]
pub use delta::{render_delta, stat_delta, DEFAULT_DELTA};
#[doc(inline)]
pub use merge::{
    merge_effects, MergedSet, PriorCatalog, PriorCatalogSource, RepairingParse, StrictParse,
};
#[doc(inline)]
pub use reconcile::{reconcile_set, EquipmentSet, Item};
#[doc(inline)]
pub use tier::{Slot, SourceItem, StatMap, Tier, TierDocument, TierLoader, TierSet};
#[doc(inline)]
pub use value::{StatFormat, StatValue};

/// Errors from catalog reconciliation
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Malformed stat value: {value:?}")]
    MalformedValue { value: String },

    #[error("Inconsistent format for stat {stat}: base is {base}, upgrade is {upgraded}")]
    InconsistentStatFormat {
        stat: String,
        base: StatFormat,
        upgraded: StatFormat,
    },

    #[error("No Base tier file found for set {set}")]
    MissingBaseTier { set: String },

    #[error("Malformed prior catalog: {0}")]
    MalformedPriorCatalog(String),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }
}
