//! Whole-run orchestration
//!
//! Each set is processed on its own; a set that fails to load is logged and
//! skipped while the rest of the run continues.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::catalog::{write_json, write_sets};
use crate::config::PipelineConfig;
use crate::merge::{merge_effects, PriorCatalog};
use crate::reconcile::{reconcile_set, EquipmentSet, Reconciliation};
use crate::tier::{read_tier_document, Tier, TierLoader};
use crate::{Error, Result};

/// Outcome of [`rebuild`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    pub sets_written: usize,
    pub sets_skipped: usize,
    pub items_written: usize,
    pub stat_failures: usize,
}

/// Outcome of [`refresh_effects`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectsSummary {
    pub sets_updated: usize,
    pub sets_created: usize,
    pub prior_sets: usize,
}

/// Set directory names under `root`, sorted, minus skipped ones.
///
/// Symlinked set directories are followed. An entry that cannot be read is
/// logged and left out; only an unreadable root fails.
pub fn discover_sets(config: &PipelineConfig) -> Result<Vec<String>> {
    let mut dirs = Vec::new();
    for entry in walk_root(config, 1) {
        let Some(entry) = usable_entry(&config.root, entry)? else {
            continue;
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if config.is_skipped(&name) {
            tracing::debug!("Skipping directory {}", name);
            continue;
        }
        dirs.push(name);
    }
    Ok(dirs)
}

/// Reconcile a single set directory
pub fn reconcile_dir(config: &PipelineConfig, set_dir: &str) -> Result<Reconciliation> {
    let tiers = TierLoader::new(&config.root).load_set(set_dir)?;
    Ok(reconcile_set(
        &tiers,
        config.alignment_for(set_dir),
        config.default_level,
    ))
}

/// Reconcile every set under the root.
///
/// Sets are returned sorted by name. When two directories produce the same
/// set name, the first one wins.
pub fn reconcile_all(config: &PipelineConfig) -> Result<(Vec<EquipmentSet>, RebuildSummary)> {
    config.validate()?;

    let mut summary = RebuildSummary::default();
    let mut seen = HashSet::new();
    let mut sets = Vec::new();

    for set_dir in discover_sets(config)? {
        let reconciliation = match reconcile_dir(config, &set_dir) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", set_dir, e);
                summary.sets_skipped += 1;
                continue;
            }
        };

        let set = reconciliation.set;
        if !seen.insert(set.name.clone()) {
            tracing::warn!("Skipping {}: duplicate set name {:?}", set_dir, set.name);
            summary.sets_skipped += 1;
            continue;
        }

        tracing::info!("✓ {}: {} items", set.name, set.item_count());
        summary.stat_failures += reconciliation.stat_failures;
        summary.items_written += set.item_count();
        sets.push(set);
    }

    sets.sort_by(|a, b| a.name.cmp(&b.name));
    summary.sets_written = sets.len();
    Ok((sets, summary))
}

/// Rebuild the full catalog and write it to `config.output`
pub fn rebuild(config: &PipelineConfig) -> Result<RebuildSummary> {
    let (sets, summary) = reconcile_all(config)?;
    write_sets(&config.output, &sets, config.format)?;
    tracing::info!(
        "Wrote {} sets to {}",
        summary.sets_written,
        config.output.display()
    );
    Ok(summary)
}

/// Set effect text from every Base tier export, keyed by set name
pub fn collect_set_effects(config: &PipelineConfig) -> Result<BTreeMap<String, String>> {
    config.validate()?;

    let mut effects = BTreeMap::new();
    for path in base_tier_files(config)? {
        match read_tier_document(&path) {
            Ok(doc) => {
                tracing::info!("  {}: OK", doc.name);
                effects.insert(doc.name, doc.set_effect);
            }
            Err(e) => tracing::warn!("Error reading {}: {}", path.display(), e),
        }
    }

    tracing::info!("Total set effects extracted: {}", effects.len());
    Ok(effects)
}

/// Refresh set effects against the prior catalog and write the result
pub fn refresh_effects(config: &PipelineConfig) -> Result<EffectsSummary> {
    let effects = collect_set_effects(config)?;

    let source = config.prior_source.source();
    let prior = PriorCatalog::load(config.prior_path(), source.as_ref());
    let merged = merge_effects(&effects, &prior);

    write_json(&config.output, &merged)?;

    let sets_created = merged.iter().filter(|s| s.created).count();
    Ok(EffectsSummary {
        sets_updated: merged.len() - sets_created,
        sets_created,
        prior_sets: prior.len(),
    })
}

/// `Base_*_equipments.json` files one level below the root
fn base_tier_files(config: &PipelineConfig) -> Result<Vec<PathBuf>> {
    let prefix = format!("{}_", Tier::Base.label());
    let mut files = Vec::new();

    for entry in walk_root(config, 2) {
        let Some(entry) = usable_entry(&config.root, entry)? else {
            continue;
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let in_skipped_dir = entry
            .path()
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|d| config.is_skipped(&d.to_string_lossy()));
        if in_skipped_dir {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if name.starts_with(&prefix) && name.ends_with("_equipments.json") {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Entries exactly `depth` levels below the root, following symlinks
fn walk_root(config: &PipelineConfig, depth: usize) -> walkdir::IntoIter {
    WalkDir::new(&config.root)
        .min_depth(depth)
        .max_depth(depth)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
}

/// Unwrap a walk entry. Errors below the root are logged and yield `None`.
fn usable_entry(root: &Path, entry: walkdir::Result<DirEntry>) -> Result<Option<DirEntry>> {
    match entry {
        Ok(entry) => Ok(Some(entry)),
        Err(e) if e.depth() == 0 => Err(walk_error(root, e)),
        Err(e) => {
            tracing::warn!("Skipping unreadable entry: {}", e);
            Ok(None)
        }
    }
}

fn walk_error(root: &Path, e: walkdir::Error) -> Error {
    let path = e.path().unwrap_or(root).to_path_buf();
    let source = e
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("directory loop"));
    Error::io(path, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, OutputFormat};
    use crate::delta::DEFAULT_DELTA;
    use serde_json::Value;
    use std::fs;

    fn write_tier(root: &Path, set_dir: &str, tier: Tier, json: Value) {
        let dir = root.join(set_dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(tier.file_name(set_dir)), json.to_string()).unwrap();
    }

    fn tier_doc(name: &str, effect: &str, atk: &str, crit: &str) -> Value {
        serde_json::json!({
            "name": name,
            "setEffect": effect,
            "equipment": {
                "Body": [{
                    "itemId": format!("{name}_body"),
                    "imageSrc": "body.png",
                    "level": 70,
                    "stats": {"DEF": "40", "ATK": atk, "CRIT": crit}
                }],
                "EDC": [{
                    "itemId": format!("{name}_edc"),
                    "imageSrc": "edc.png",
                    "stats": {"ATK": atk}
                }]
            }
        })
    }

    fn config_for(root: &Path) -> PipelineConfig {
        PipelineConfig {
            root: root.to_path_buf(),
            output: root.join("out/equipment_sets.json"),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_discover_sets_sorted_and_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        for dir in ["Zenith", "Aurora", "Standalone Equipment"] {
            fs::create_dir_all(temp_dir.path().join(dir)).unwrap();
        }
        fs::write(temp_dir.path().join("notes.txt"), "x").unwrap();

        let dirs = discover_sets(&config_for(temp_dir.path())).unwrap();
        assert_eq!(dirs, vec!["Aurora", "Zenith"]);
    }

    #[test]
    fn test_rebuild_end_to_end() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_tier(root, "Aurora", Tier::Base, tier_doc("Aurora", "fx", "100", "5.0%"));
        write_tier(root, "Aurora", Tier::Plus1, tier_doc("Aurora", "fx", "120", "7.5%"));
        write_tier(root, "Aurora", Tier::Plus3, tier_doc("Aurora", "fx", "160", "12.5%"));
        // No Base tier: skipped
        write_tier(root, "Broken", Tier::Plus1, tier_doc("Broken", "fx", "1", "1%"));

        let config = config_for(root);
        let summary = rebuild(&config).unwrap();
        assert_eq!(summary.sets_written, 1);
        assert_eq!(summary.sets_skipped, 1);
        assert_eq!(summary.items_written, 2);

        let catalog: Catalog =
            serde_json::from_str(&fs::read_to_string(&config.output).unwrap()).unwrap();
        let set = catalog.get("Aurora").unwrap();
        let body = &set.items[0];
        assert_eq!(body.upgrades[&Tier::Plus1]["ATK"], "20");
        assert_eq!(body.upgrades[&Tier::Plus1]["CRIT"], "2.5%");
        assert_eq!(body.upgrades[&Tier::Plus2]["ATK"], DEFAULT_DELTA);
        assert_eq!(body.upgrades[&Tier::Plus2]["CRIT"], DEFAULT_DELTA);
        assert_eq!(body.upgrades[&Tier::Plus3]["CRIT"], "7.5%");

        let edc = &set.items[1];
        assert_eq!(edc.name, "Aurora EDC");
        assert_eq!(edc.level, 70);

        for item in &set.items {
            for stats in item.upgrades.values() {
                assert!(!stats.contains_key("DEF"));
                assert!(stats.keys().all(|k| item.base_stats.contains_key(k)));
            }
        }
    }

    #[test]
    fn test_rebuild_gear_format() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_tier(root, "Aurora", Tier::Base, tier_doc("Aurora", "fx", "100", "5%"));
        write_tier(root, "Aurora", Tier::Plus2, tier_doc("Aurora", "fx", "130", "6%"));

        let config = PipelineConfig {
            format: OutputFormat::Gear,
            ..config_for(root)
        };
        rebuild(&config).unwrap();

        let json: Value =
            serde_json::from_str(&fs::read_to_string(&config.output).unwrap()).unwrap();
        let upgrades = &json["Aurora"]["equipment"]["Body"][0]["statUpgrades"];
        assert_eq!(upgrades["ATK"]["+2"], "30");
        assert_eq!(upgrades["CRIT"]["+2"], "1.0%");
        assert_eq!(upgrades["ATK"]["+1"], "0");
    }

    #[test]
    fn test_duplicate_set_names_keep_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_tier(root, "A", Tier::Base, tier_doc("Same", "first", "1", "1%"));
        write_tier(root, "B", Tier::Base, tier_doc("Same", "second", "1", "1%"));

        let (sets, summary) = reconcile_all(&config_for(root)).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].set_effect, "first");
        assert_eq!(summary.sets_skipped, 1);
    }

    #[test]
    fn test_missing_root_is_error() {
        let config = PipelineConfig {
            root: PathBuf::from("/definitely/not/here"),
            ..PipelineConfig::default()
        };
        assert!(rebuild(&config).is_err());
    }

    #[test]
    fn test_refresh_effects_with_prior() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_tier(root, "Aurora", Tier::Base, tier_doc("Aurora", "new aurora", "1", "1%"));
        write_tier(root, "Beacon", Tier::Base, tier_doc("Beacon", "new beacon", "1", "1%"));
        write_tier(root, "Beacon", Tier::Plus1, tier_doc("Beacon", "ignored", "1", "1%"));

        let prior_path = root.join("old.json");
        fs::write(
            &prior_path,
            concat!(
                "[\n",
                "  {\"name\": \"Aurora\", \"setEffect\": \"old\",",
                " \"items\": [{\"id\": \"kept\"}]},\n",
                "  [",
            ),
        )
        .unwrap();

        let config = PipelineConfig {
            prior: Some(prior_path),
            ..config_for(root)
        };
        let summary = refresh_effects(&config).unwrap();
        assert_eq!(summary.sets_updated, 1);
        assert_eq!(summary.sets_created, 1);
        assert_eq!(summary.prior_sets, 1);

        let json: Value =
            serde_json::from_str(&fs::read_to_string(&config.output).unwrap()).unwrap();
        assert_eq!(json[0]["name"], "Aurora");
        assert_eq!(json[0]["setEffect"], "new aurora");
        assert_eq!(json[0]["items"][0]["id"], "kept");
        assert_eq!(json[1]["name"], "Beacon");
        assert_eq!(json[1]["items"], serde_json::json!([]));
    }

    #[test]
    fn test_refresh_effects_without_prior() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_tier(root, "Aurora", Tier::Base, tier_doc("Aurora", "fresh", "1", "1%"));

        let config = config_for(root);
        let summary = refresh_effects(&config).unwrap();
        assert_eq!(summary.prior_sets, 0);
        assert_eq!(summary.sets_created, 1);

        let json: Value =
            serde_json::from_str(&fs::read_to_string(&config.output).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"name": "Aurora", "setEffect": "fresh", "items": []}])
        );
    }

    #[test]
    fn test_refresh_effects_is_fixed_point() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_tier(root, "Aurora", Tier::Base, tier_doc("Aurora", "fx", "100", "5%"));

        let config = config_for(root);
        rebuild(&config).unwrap();
        let rebuilt: Value =
            serde_json::from_str(&fs::read_to_string(&config.output).unwrap()).unwrap();

        // Merge against the just-written catalog, in place
        refresh_effects(&config).unwrap();
        let merged: Value =
            serde_json::from_str(&fs::read_to_string(&config.output).unwrap()).unwrap();
        assert_eq!(merged[0]["items"], rebuilt[0]["items"]);

        refresh_effects(&config).unwrap();
        let again: Value =
            serde_json::from_str(&fs::read_to_string(&config.output).unwrap()).unwrap();
        assert_eq!(again, merged);
    }

    #[test]
    fn test_rebuild_keeps_stat_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let base = serde_json::json!({
            "name": "Aurora",
            "setEffect": "fx",
            "equipment": {"Body": [{
                "itemId": "body",
                "stats": {"DEF": "50", "Strength": "30", "ATK": "100"}
            }]}
        });
        write_tier(root, "Aurora", Tier::Base, base);

        for format in [OutputFormat::Catalog, OutputFormat::Gear] {
            let config = PipelineConfig {
                format,
                ..config_for(root)
            };
            rebuild(&config).unwrap();

            let json: Value =
                serde_json::from_str(&fs::read_to_string(&config.output).unwrap()).unwrap();
            let item = match format {
                OutputFormat::Catalog => &json[0]["items"][0],
                OutputFormat::Gear => &json["Aurora"]["equipment"]["Body"][0],
            };
            let keys: Vec<_> = item["baseStats"].as_object().unwrap().keys().cloned().collect();
            assert_eq!(keys, vec!["DEF", "Strength", "ATK"]);

            let upgrades = match format {
                OutputFormat::Catalog => &item["upgrades"]["+1"],
                OutputFormat::Gear => &item["statUpgrades"],
            };
            let keys: Vec<_> = upgrades.as_object().unwrap().keys().cloned().collect();
            assert_eq!(keys, vec!["Strength", "ATK"]);
        }
    }

    #[test]
    fn test_rebuild_carries_non_standard_slots() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let base = serde_json::json!({
            "name": "Aurora",
            "setEffect": "fx",
            "equipment": {
                "Weapon": [{"itemId": "w", "stats": {"ATK": "10"}}],
                "Body": [{"itemId": "b", "stats": {"ATK": "1"}}]
            }
        });
        write_tier(root, "Aurora", Tier::Base, base);

        let config = PipelineConfig {
            format: OutputFormat::Gear,
            ..config_for(root)
        };
        rebuild(&config).unwrap();

        let json: Value =
            serde_json::from_str(&fs::read_to_string(&config.output).unwrap()).unwrap();
        let slots: Vec<_> = json["Aurora"]["equipment"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(slots, vec!["Body", "Weapon"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_set_link_does_not_abort() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_tier(root, "Aurora", Tier::Base, tier_doc("Aurora", "fx", "1", "1%"));
        std::os::unix::fs::symlink(root.join("gone"), root.join("Ghost")).unwrap();

        let config = config_for(root);
        assert_eq!(discover_sets(&config).unwrap(), vec!["Aurora"]);

        let summary = refresh_effects(&config).unwrap();
        assert_eq!(summary.sets_created, 1);
        let json: Value =
            serde_json::from_str(&fs::read_to_string(&config.output).unwrap()).unwrap();
        assert_eq!(json[0]["name"], "Aurora");

        assert_eq!(rebuild(&config).unwrap().sets_written, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_set_dir_is_followed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("sets");
        let elsewhere = temp_dir.path().join("elsewhere");
        write_tier(&elsewhere, "Aurora", Tier::Base, tier_doc("Aurora", "fx", "1", "1%"));
        fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(elsewhere.join("Aurora"), root.join("Aurora")).unwrap();

        let config = config_for(&root);
        assert_eq!(discover_sets(&config).unwrap(), vec!["Aurora"]);
        assert_eq!(collect_set_effects(&config).unwrap()["Aurora"], "fx");
        assert_eq!(rebuild(&config).unwrap().sets_written, 1);
    }
}
