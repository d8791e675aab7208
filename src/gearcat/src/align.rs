//! Item alignment across tiers
//!
//! Two policies exist because the exports have not always been consistent:
//!
//! - [`AlignmentPolicy::Identifier`] matches items by `itemId` and ignores
//!   ordering. This is the default.
//! - [`AlignmentPolicy::Positional`] matches items by their index inside a
//!   slot list. It is only usable when identifiers are unreliable, and it
//!   produces no matches at all for a slot whose lists differ in length.
//!
//! Alignment never crosses slots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::tier::{Slot, SourceItem, Tier};

/// How items in an upgrade tier are matched to Base items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentPolicy {
    #[default]
    Identifier,
    Positional,
}

impl AlignmentPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            AlignmentPolicy::Identifier => "identifier",
            AlignmentPolicy::Positional => "positional",
        }
    }
}

impl fmt::Display for AlignmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlignmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "identifier" | "id" => Ok(AlignmentPolicy::Identifier),
            "positional" | "position" | "index" => Ok(AlignmentPolicy::Positional),
            other => Err(format!(
                "unknown alignment policy '{other}' (expected identifier or positional)"
            )),
        }
    }
}

/// Where an alignment is being performed, for log messages
#[derive(Debug, Clone, Copy)]
pub struct AlignContext<'a> {
    pub set: &'a str,
    pub slot: &'a Slot,
    pub tier: Tier,
}

/// Match every Base item in one slot to its counterpart in an upgrade tier.
///
/// The result has one entry per Base item, in Base order.
pub fn align_slot<'a>(
    policy: AlignmentPolicy,
    ctx: AlignContext<'_>,
    base: &[SourceItem],
    upgraded: &'a [SourceItem],
) -> Vec<Option<&'a SourceItem>> {
    match policy {
        AlignmentPolicy::Identifier => base
            .iter()
            .map(|item| find_by_id(upgraded, &item.item_id))
            .collect(),
        AlignmentPolicy::Positional => {
            if base.len() != upgraded.len() {
                tracing::warn!(
                    "{}: {} list has {} items at Base but {} at {}; positional alignment skipped",
                    ctx.set,
                    ctx.slot,
                    base.len(),
                    upgraded.len(),
                    ctx.tier
                );
                return vec![None; base.len()];
            }
            upgraded.iter().map(Some).collect()
        }
    }
}

/// First item carrying `item_id`. Empty identifiers never match.
fn find_by_id<'a>(items: &'a [SourceItem], item_id: &str) -> Option<&'a SourceItem> {
    if item_id.is_empty() {
        return None;
    }
    items.iter().find(|i| i.item_id == item_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn item(id: &str, atk: &str) -> SourceItem {
        SourceItem {
            item_id: id.to_string(),
            image_src: String::new(),
            level: Some(70),
            stats: IndexMap::from([("ATK".to_string(), atk.to_string())]),
        }
    }

    fn ctx() -> AlignContext<'static> {
        AlignContext {
            set: "Aurora",
            slot: &Slot::Body,
            tier: Tier::Plus1,
        }
    }

    #[test]
    fn test_identifier_alignment_ignores_order() {
        let base = vec![item("a", "1"), item("b", "2")];
        let upgraded = vec![item("b", "20"), item("a", "10")];

        let aligned = align_slot(AlignmentPolicy::Identifier, ctx(), &base, &upgraded);
        assert_eq!(aligned[0].unwrap().stats["ATK"], "10");
        assert_eq!(aligned[1].unwrap().stats["ATK"], "20");
    }

    #[test]
    fn test_identifier_alignment_missing_item() {
        let base = vec![item("a", "1"), item("c", "3")];
        let upgraded = vec![item("a", "10")];

        let aligned = align_slot(AlignmentPolicy::Identifier, ctx(), &base, &upgraded);
        assert!(aligned[0].is_some());
        assert!(aligned[1].is_none());
    }

    #[test]
    fn test_identifier_alignment_first_match_wins() {
        let base = vec![item("a", "1")];
        let upgraded = vec![item("a", "10"), item("a", "99")];

        let aligned = align_slot(AlignmentPolicy::Identifier, ctx(), &base, &upgraded);
        assert_eq!(aligned[0].unwrap().stats["ATK"], "10");
    }

    #[test]
    fn test_empty_identifier_never_matches() {
        let base = vec![item("", "1")];
        let upgraded = vec![item("", "10")];

        let aligned = align_slot(AlignmentPolicy::Identifier, ctx(), &base, &upgraded);
        assert!(aligned[0].is_none());
    }

    #[test]
    fn test_positional_alignment_uses_index() {
        let base = vec![item("a", "1"), item("b", "2")];
        let upgraded = vec![item("b", "20"), item("a", "10")];

        // The two policies disagree when ordering differs
        let aligned = align_slot(AlignmentPolicy::Positional, ctx(), &base, &upgraded);
        assert_eq!(aligned[0].unwrap().item_id, "b");
        assert_eq!(aligned[1].unwrap().item_id, "a");
    }

    #[test]
    fn test_positional_alignment_length_mismatch() {
        let base = vec![item("a", "1"), item("b", "2")];
        let upgraded = vec![item("a", "10")];

        let aligned = align_slot(AlignmentPolicy::Positional, ctx(), &base, &upgraded);
        assert_eq!(aligned.len(), 2);
        assert!(aligned.iter().all(Option::is_none));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "Positional".parse::<AlignmentPolicy>().unwrap(),
            AlignmentPolicy::Positional
        );
        assert_eq!(
            "id".parse::<AlignmentPolicy>().unwrap(),
            AlignmentPolicy::Identifier
        );
        assert!("fuzzy".parse::<AlignmentPolicy>().is_err());
    }

    #[test]
    fn test_policy_serde() {
        let json = serde_json::to_string(&AlignmentPolicy::Positional).unwrap();
        assert_eq!(json, "\"positional\"");
    }
}
