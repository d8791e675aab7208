//! Tier documents and the loader that finds them on disk
//!
//! Each equipment set lives in its own directory under the source root, with
//! one export per tier:
//!
//! ```text
//! <root>/<SetDir>/Base_<SetDir>_equipments.json
//! <root>/<SetDir>/+1_<SetDir>_equipments.json
//! <root>/<SetDir>/+2_<SetDir>_equipments.json
//! <root>/<SetDir>/+3_<SetDir>_equipments.json
//! ```
//!
//! Only the Base tier is mandatory.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Upgrade level of an equipment item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Base,
    Plus1,
    Plus2,
    Plus3,
}

impl Tier {
    /// All tiers, Base first
    pub const ALL: [Tier; 4] = [Tier::Base, Tier::Plus1, Tier::Plus2, Tier::Plus3];

    /// Tiers that carry deltas
    pub const UPGRADES: [Tier; 3] = [Tier::Plus1, Tier::Plus2, Tier::Plus3];

    /// Label used in file names and output keys
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Base => "Base",
            Tier::Plus1 => "+1",
            Tier::Plus2 => "+2",
            Tier::Plus3 => "+3",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Tier::ALL.into_iter().find(|t| t.label() == label)
    }

    /// File name of this tier's export for a set directory
    pub fn file_name(&self, set_dir: &str) -> String {
        format!("{}_{}_equipments.json", self.label(), set_dir)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Tier {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Tier::from_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown tier label: {label}")))
    }
}

/// Equipment slot category
///
/// Body, Hand and EDC sort first in that order; any other slot key found in
/// an export is carried as [`Slot::Other`] and sorts after them by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Body,
    Hand,
    Edc,
    Other(String),
}

impl Slot {
    pub fn as_str(&self) -> &str {
        match self {
            Slot::Body => "Body",
            Slot::Hand => "Hand",
            Slot::Edc => "EDC",
            Slot::Other(key) => key,
        }
    }

    /// Slot for a raw export key. Matching is exact.
    pub fn from_key(key: &str) -> Self {
        match key {
            "Body" => Slot::Body,
            "Hand" => Slot::Hand,
            "EDC" => Slot::Edc,
            other => Slot::Other(other.to_string()),
        }
    }

    pub fn is_standard(&self) -> bool {
        !matches!(self, Slot::Other(_))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(Slot::from_key(&key))
    }
}

/// Stat name -> raw value, in export order
pub type StatMap = IndexMap<String, String>;

/// One item record as exported for a single tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceItem {
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub image_src: String,
    #[serde(default, deserialize_with = "de_level")]
    pub level: Option<u32>,
    #[serde(default, deserialize_with = "de_stats")]
    pub stats: StatMap,
}

/// One tier export for one equipment set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierDocument {
    pub name: String,
    #[serde(default)]
    pub set_effect: String,
    /// Raw slot key -> items, in source order
    #[serde(default)]
    pub equipment: BTreeMap<String, Vec<SourceItem>>,
}

impl TierDocument {
    /// Items for a slot, or an empty slice if the slot is absent
    pub fn slot_items(&self, slot: &Slot) -> &[SourceItem] {
        self.equipment
            .get(slot.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every slot present, standard slots first
    pub fn slots(&self) -> Vec<Slot> {
        let mut slots: Vec<Slot> = self.equipment.keys().map(|k| Slot::from_key(k)).collect();
        slots.sort();
        slots
    }
}

/// Every tier document found for one set
#[derive(Debug, Clone)]
pub struct TierSet {
    /// Directory name the set was loaded from
    pub dir: String,
    pub base: TierDocument,
    pub upgrades: BTreeMap<Tier, TierDocument>,
}

impl TierSet {
    pub fn new(dir: impl Into<String>, base: TierDocument) -> Self {
        TierSet {
            dir: dir.into(),
            base,
            upgrades: BTreeMap::new(),
        }
    }

    pub fn with_upgrade(mut self, tier: Tier, doc: TierDocument) -> Self {
        if tier != Tier::Base {
            self.upgrades.insert(tier, doc);
        }
        self
    }

    pub fn upgrade(&self, tier: Tier) -> Option<&TierDocument> {
        self.upgrades.get(&tier)
    }
}

/// Loads tier documents from a source root directory
#[derive(Debug, Clone)]
pub struct TierLoader {
    root: PathBuf,
}

impl TierLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        TierLoader { root: root.into() }
    }

    /// Path of a tier export for a set directory
    pub fn tier_path(&self, set_dir: &str, tier: Tier) -> PathBuf {
        self.root.join(set_dir).join(tier.file_name(set_dir))
    }

    /// Load one tier document.
    ///
    /// Returns `Ok(None)` when the file does not exist; that is a normal
    /// state for upgrade tiers.
    pub fn load(&self, set_dir: &str, tier: Tier) -> Result<Option<TierDocument>> {
        let path = self.tier_path(set_dir, tier);
        if !path.is_file() {
            tracing::debug!("{} tier absent for {}", tier, set_dir);
            return Ok(None);
        }

        read_tier_document(&path).map(Some)
    }

    /// Load Base plus whichever upgrade tiers exist.
    ///
    /// A missing or unreadable Base tier fails the set. An unreadable upgrade
    /// tier is logged and treated as absent.
    pub fn load_set(&self, set_dir: &str) -> Result<TierSet> {
        let base = self
            .load(set_dir, Tier::Base)?
            .ok_or_else(|| Error::MissingBaseTier {
                set: set_dir.to_string(),
            })?;

        let mut set = TierSet::new(set_dir, base);
        for tier in Tier::UPGRADES {
            match self.load(set_dir, tier) {
                Ok(Some(doc)) => {
                    tracing::debug!("{} tier loaded for {}", tier, set_dir);
                    set.upgrades.insert(tier, doc);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Ignoring {} tier for {}: {}", tier, set_dir, e),
            }
        }

        Ok(set)
    }
}

/// Read and parse a tier export
pub fn read_tier_document(path: &Path) -> Result<TierDocument> {
    let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| Error::json(path, e))
}

/// Accept numbers or numeric strings for stat values
fn de_stats<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<StatMap, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawStat {
        Text(String),
        Number(serde_json::Number),
    }

    let raw = IndexMap::<String, RawStat>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(k, v)| {
            let text = match v {
                RawStat::Text(s) => s,
                RawStat::Number(n) => n.to_string(),
            };
            (k, text)
        })
        .collect())
}

/// Accept `70` or `"70"`; anything else reads as missing
fn de_level<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u32>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
