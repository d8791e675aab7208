//! Set reconciliation
//!
//! Builds one [`EquipmentSet`] from a [`TierSet`]: identity fields and base
//! stats come from the Base tier verbatim, and every non-DEF stat gets a
//! delta for each upgrade tier.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::align::{align_slot, AlignContext, AlignmentPolicy};
use crate::delta::{delta_between, DEFAULT_DELTA};
use crate::tier::{Slot, SourceItem, StatMap, Tier, TierSet};

/// Stats that never receive upgrade deltas
pub const FIXED_STATS: &[&str] = &["DEF"];

/// Per-stat deltas, keyed by upgrade tier
pub type TierDeltas = BTreeMap<Tier, String>;

/// A reconciled equipment item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub slot: Slot,
    pub set: String,
    pub level: u32,
    pub image: String,
    pub base_stats: StatMap,
    /// Stat name -> tier -> rendered delta, in Base stat order
    pub stat_upgrades: IndexMap<String, TierDeltas>,
}

impl Item {
    /// Deltas pivoted to tier -> stat -> delta.
    ///
    /// Every upgrade tier is present, even when the item has no upgradable
    /// stats.
    pub fn upgrades_by_tier(&self) -> BTreeMap<Tier, StatMap> {
        let mut by_tier: BTreeMap<Tier, StatMap> = Tier::UPGRADES
            .into_iter()
            .map(|t| (t, StatMap::new()))
            .collect();

        for (stat, deltas) in &self.stat_upgrades {
            for (tier, delta) in deltas {
                by_tier
                    .entry(*tier)
                    .or_default()
                    .insert(stat.clone(), delta.clone());
            }
        }

        by_tier
    }
}

/// A reconciled equipment set
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentSet {
    pub name: String,
    pub set_effect: String,
    /// Source directory name
    pub dir: String,
    pub equipment: BTreeMap<Slot, Vec<Item>>,
}

impl EquipmentSet {
    /// All items in slot order
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.equipment.values().flatten()
    }

    pub fn item_count(&self) -> usize {
        self.equipment.values().map(Vec::len).sum()
    }
}

/// Result of reconciling one set
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub set: EquipmentSet,
    /// Stats whose delta could not be computed for at least one tier
    pub stat_failures: usize,
}

/// Reconcile every tier of one set.
///
/// `policy` selects how upgrade-tier items are matched to Base items.
/// Items without a level take `default_level`.
pub fn reconcile_set(
    tiers: &TierSet,
    policy: AlignmentPolicy,
    default_level: u32,
) -> Reconciliation {
    let base = &tiers.base;
    let set_name = base.name.clone();
    let mut stat_failures = 0;

    let mut equipment = BTreeMap::new();
    for slot in base.slots() {
        if !slot.is_standard() {
            tracing::debug!("{}: carrying non-standard slot {:?}", tiers.dir, slot.as_str());
        }
        let base_items = base.slot_items(&slot);

        // Upgrade tier -> counterpart per Base item
        let aligned: BTreeMap<Tier, Vec<Option<&SourceItem>>> = tiers
            .upgrades
            .iter()
            .map(|(tier, doc)| {
                let ctx = AlignContext {
                    set: &tiers.dir,
                    slot: &slot,
                    tier: *tier,
                };
                (*tier, align_slot(policy, ctx, base_items, doc.slot_items(&slot)))
            })
            .collect();

        let mut items = Vec::with_capacity(base_items.len());
        for (idx, base_item) in base_items.iter().enumerate() {
            let counterparts: BTreeMap<Tier, &SourceItem> = aligned
                .iter()
                .filter_map(|(tier, matches)| {
                    matches.get(idx).copied().flatten().map(|m| (*tier, m))
                })
                .collect();

            let (stat_upgrades, failures) =
                upgrade_deltas(&tiers.dir, base_item, &counterparts);
            stat_failures += failures;

            items.push(Item {
                id: base_item.item_id.clone(),
                name: format!("{} {}", set_name, slot),
                slot: slot.clone(),
                set: set_name.clone(),
                level: base_item.level.unwrap_or(default_level),
                image: base_item.image_src.clone(),
                base_stats: base_item.stats.clone(),
                stat_upgrades,
            });
        }

        equipment.insert(slot, items);
    }

    Reconciliation {
        set: EquipmentSet {
            name: set_name,
            set_effect: base.set_effect.clone(),
            dir: tiers.dir.clone(),
            equipment,
        },
        stat_failures,
    }
}

/// Build the delta table for one item.
///
/// Returns the table and the number of stats that failed for some tier.
fn upgrade_deltas(
    set_dir: &str,
    base_item: &SourceItem,
    counterparts: &BTreeMap<Tier, &SourceItem>,
) -> (IndexMap<String, TierDeltas>, usize) {
    let mut table = IndexMap::new();
    let mut failures = 0;

    for (stat, raw_base) in &base_item.stats {
        if FIXED_STATS.contains(&stat.as_str()) {
            continue;
        }

        let mut deltas: TierDeltas = Tier::UPGRADES
            .into_iter()
            .map(|t| (t, DEFAULT_DELTA.to_string()))
            .collect();

        let mut failed = false;
        for (tier, counterpart) in counterparts {
            let Some(raw_upgraded) = counterpart.stats.get(stat) else {
                continue;
            };
            match delta_between(stat, raw_base, raw_upgraded) {
                Ok(delta) => {
                    deltas.insert(*tier, delta);
                }
                Err(e) => {
                    tracing::warn!(
                        "{}: {} {} at {}: {}",
                        set_dir,
                        base_item.item_id,
                        stat,
                        tier,
                        e
                    );
                    failed = true;
                }
            }
        }
        if failed {
            failures += 1;
        }

        table.insert(stat.clone(), deltas);
    }

    (table, failures)
}
