//! Catalog merging
//!
//! Refreshes set-effect text from the Base tier exports while keeping the
//! item lists of a previously written catalog. The prior catalog is optional
//! and may be damaged; reading it never fails the run.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Parses the text of a prior catalog into raw set records
pub trait PriorCatalogSource {
    /// Short name for log messages
    fn name(&self) -> &'static str;

    /// Parse a prior catalog document into its top-level records
    fn parse(&self, raw: &str) -> Result<Vec<Value>>;
}

/// Accepts only a well-formed JSON array
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictParse;

impl PriorCatalogSource for StrictParse {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn parse(&self, raw: &str) -> Result<Vec<Value>> {
        parse_records(raw)
    }
}

/// Parses like [`StrictParse`], and on failure makes one attempt to re-close
/// an array whose tail was cut off
#[derive(Debug, Clone, Copy, Default)]
pub struct RepairingParse;

impl PriorCatalogSource for RepairingParse {
    fn name(&self) -> &'static str {
        "repair"
    }

    fn parse(&self, raw: &str) -> Result<Vec<Value>> {
        if !raw.trim_start().starts_with('[') {
            return Err(Error::MalformedPriorCatalog(
                "document is not an array".to_string(),
            ));
        }

        let strict_err = match parse_records(raw) {
            Ok(records) => return Ok(records),
            Err(e) => e,
        };

        let Some(repaired) = close_truncated_array(raw) else {
            return Err(strict_err);
        };

        tracing::warn!("Prior catalog is not closed, attempting repair");
        parse_records(&repaired)
    }
}

fn parse_records(raw: &str) -> Result<Vec<Value>> {
    serde_json::from_str(raw).map_err(|e| Error::MalformedPriorCatalog(e.to_string()))
}

/// Re-close an array whose tail is missing.
///
/// Trims trailing whitespace and commas plus one dangling `[` or `{`, then
/// appends `]`. Returns `None` when the document already ends with `]`.
pub fn close_truncated_array(raw: &str) -> Option<String> {
    let trimmed = raw.trim_end();
    if trimmed.ends_with(']') {
        return None;
    }

    let without_open = trimmed
        .strip_suffix('[')
        .or_else(|| trimmed.strip_suffix('{'))
        .unwrap_or(trimmed);
    let body = without_open.trim_end_matches(|c: char| c == ',' || c.is_whitespace());

    Some(format!("{body}\n]"))
}

/// Item lists from a previous catalog, keyed by set name
#[derive(Debug, Clone, Default)]
pub struct PriorCatalog {
    sets: HashMap<String, Vec<Value>>,
}

impl PriorCatalog {
    pub fn empty() -> Self {
        PriorCatalog::default()
    }

    /// Build from raw records. Records without a string `name` are ignored;
    /// a later record replaces an earlier one with the same name.
    pub fn from_records(records: Vec<Value>) -> Self {
        let mut sets = HashMap::new();
        for record in records {
            let Value::Object(mut fields) = record else {
                continue;
            };
            let Some(Value::String(name)) = fields.remove("name") else {
                continue;
            };
            let items = match fields.remove("items") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            sets.insert(name, items);
        }
        PriorCatalog { sets }
    }

    /// Load a prior catalog from disk.
    ///
    /// A missing, unreadable or unparseable file yields an empty catalog and
    /// a warning.
    pub fn load(path: &Path, source: &dyn PriorCatalogSource) -> Self {
        if !path.is_file() {
            tracing::info!("No prior catalog at {}", path.display());
            return PriorCatalog::empty();
        }

        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Could not read prior catalog {}: {}", path.display(), e);
                return PriorCatalog::empty();
            }
        };

        match source.parse(&raw) {
            Ok(records) => {
                let prior = PriorCatalog::from_records(records);
                tracing::info!(
                    "Loaded {} sets from prior catalog ({} parse)",
                    prior.len(),
                    source.name()
                );
                prior
            }
            Err(e) => {
                tracing::warn!(
                    "Ignoring prior catalog {} ({} parse): {}",
                    path.display(),
                    source.name(),
                    e
                );
                PriorCatalog::empty()
            }
        }
    }

    pub fn items(&self, name: &str) -> Option<&[Value]> {
        self.sets.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Set record produced by [`merge_effects`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedSet {
    pub name: String,
    pub set_effect: String,
    pub items: Vec<Value>,
    /// No prior record existed for this set
    #[serde(skip)]
    pub created: bool,
}

/// Combine fresh set effects with prior item lists.
///
/// The fresh effect text always wins. Sets absent from the prior catalog get
/// an empty item list and are flagged as created. Output is sorted by name.
pub fn merge_effects(effects: &BTreeMap<String, String>, prior: &PriorCatalog) -> Vec<MergedSet> {
    effects
        .iter()
        .map(|(name, effect)| match prior.items(name) {
            Some(items) => {
                tracing::info!("Updated: {}", name);
                MergedSet {
                    name: name.clone(),
                    set_effect: effect.clone(),
                    items: items.to_vec(),
                    created: false,
                }
            }
            None => {
                tracing::info!("Created new: {}", name);
                MergedSet {
                    name: name.clone(),
                    set_effect: effect.clone(),
                    items: Vec::new(),
                    created: true,
                }
            }
        })
        .collect()
}
