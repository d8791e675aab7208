//! Output documents
//!
//! Two layouts are supported:
//!
//! - [`Catalog`]: a name-sorted list of sets, each with a flat `items` list
//!   whose `upgrades` map is keyed tier -> stat -> delta.
//! - [`GearDocument`]: sets keyed by name, items grouped by slot, with a
//!   `statUpgrades` map keyed stat -> tier -> delta.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::reconcile::{EquipmentSet, Item, TierDeltas};
use crate::tier::{Slot, StatMap, Tier};
use crate::{Error, Result};

/// Which document layout to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Catalog,
    Gear,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Catalog => "catalog",
            OutputFormat::Gear => "gear",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "catalog" => Ok(OutputFormat::Catalog),
            "gear" => Ok(OutputFormat::Gear),
            other => Err(format!("unknown output format '{other}' (expected catalog or gear)")),
        }
    }
}

/// Catalog item record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub slot: Slot,
    pub set: String,
    pub level: u32,
    pub image: String,
    pub base_stats: StatMap,
    /// Tier -> stat -> delta
    pub upgrades: BTreeMap<Tier, StatMap>,
}

impl From<&Item> for CatalogItem {
    fn from(item: &Item) -> Self {
        CatalogItem {
            id: item.id.clone(),
            name: item.name.clone(),
            slot: item.slot.clone(),
            set: item.set.clone(),
            level: item.level,
            image: item.image.clone(),
            base_stats: item.base_stats.clone(),
            upgrades: item.upgrades_by_tier(),
        }
    }
}

/// Catalog set record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSet {
    pub name: String,
    pub set_effect: String,
    pub items: Vec<CatalogItem>,
}

impl From<&EquipmentSet> for CatalogSet {
    fn from(set: &EquipmentSet) -> Self {
        CatalogSet {
            name: set.name.clone(),
            set_effect: set.set_effect.clone(),
            items: set.items().map(CatalogItem::from).collect(),
        }
    }
}

/// The full catalog, sorted by set name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub sets: Vec<CatalogSet>,
}

impl Catalog {
    pub fn from_sets<'a>(sets: impl IntoIterator<Item = &'a EquipmentSet>) -> Self {
        let mut sets: Vec<CatalogSet> = sets.into_iter().map(CatalogSet::from).collect();
        sets.sort_by(|a, b| a.name.cmp(&b.name));
        Catalog { sets }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CatalogSet> {
        self.sets.iter().find(|s| s.name == name)
    }
}

/// Slot-grouped item record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GearItem {
    pub item_id: String,
    pub image_src: String,
    pub level: u32,
    pub base_stats: StatMap,
    pub stat_upgrades: IndexMap<String, TierDeltas>,
}

/// Slot-grouped set record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GearSet {
    pub name: String,
    pub set_effect: String,
    pub equipment: BTreeMap<Slot, Vec<GearItem>>,
}

impl From<&EquipmentSet> for GearSet {
    fn from(set: &EquipmentSet) -> Self {
        let equipment = set
            .equipment
            .iter()
            .map(|(slot, items)| {
                let items = items
                    .iter()
                    .map(|item| GearItem {
                        item_id: item.id.clone(),
                        image_src: item.image.clone(),
                        level: item.level,
                        base_stats: item.base_stats.clone(),
                        stat_upgrades: item.stat_upgrades.clone(),
                    })
                    .collect();
                (slot.clone(), items)
            })
            .collect();

        GearSet {
            name: set.name.clone(),
            set_effect: set.set_effect.clone(),
            equipment,
        }
    }
}

/// Sets keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GearDocument {
    pub sets: BTreeMap<String, GearSet>,
}

impl GearDocument {
    pub fn from_sets<'a>(sets: impl IntoIterator<Item = &'a EquipmentSet>) -> Self {
        GearDocument {
            sets: sets
                .into_iter()
                .map(|s| (s.name.clone(), GearSet::from(s)))
                .collect(),
        }
    }
}

/// Write a value as pretty JSON, creating the parent directory if needed
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let mut json = serde_json::to_string_pretty(value).map_err(|e| Error::json(path, e))?;
    json.push('\n');
    fs::write(path, json).map_err(|e| Error::io(path, e))
}

/// Write reconciled sets in the requested layout
pub fn write_sets(path: &Path, sets: &[EquipmentSet], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Catalog => write_json(path, &Catalog::from_sets(sets)),
        OutputFormat::Gear => write_json(path, &GearDocument::from_sets(sets)),
    }
}
