use serde::{Deserialize, Serialize};

use crate::graph::build_list_graph_report;
use crate::ids::RecordId;
use crate::records::{EffectRecord, Item, SelectionList};
use crate::world::WorldModel;

/// Referential problem found in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogIssue {
    pub code: String,
    pub record: RecordId,
    pub message: String,
}

impl CatalogIssue {
    fn new(code: &str, record: RecordId, message: String) -> Self {
        Self {
            code: code.to_string(),
            record,
            message,
        }
    }
}

/// Validate referential consistency of the winning overrides.
///
/// This checks:
/// - list entries resolve to an item or a list
/// - item object effects resolve to an effect record
/// - nested lists do not reach themselves
pub fn validate_catalog<W: WorldModel>(world: &W) -> Vec<CatalogIssue> {
    let mut issues = Vec::new();
    let lists = world.winning_overrides::<SelectionList>();

    for list in &lists {
        for (index, entry) in list.entries.iter().enumerate() {
            if entry.reference.is_null() {
                continue;
            }
            let resolves = world.resolve::<Item>(entry.reference).is_some()
                || world.resolve::<SelectionList>(entry.reference).is_some();
            if !resolves {
                issues.push(CatalogIssue::new(
                    "dangling_entry",
                    list.id,
                    format!(
                        "entry {index} of list {} references missing record {}",
                        list.id, entry.reference
                    ),
                ));
            }
        }
    }

    for item in world.winning_overrides::<Item>() {
        if let Some(effect) = item.object_effect.filter(|id| !id.is_null()) {
            if world.resolve::<EffectRecord>(effect).is_none() {
                issues.push(CatalogIssue::new(
                    "missing_object_effect",
                    item.id,
                    format!("item {} references missing effect {effect}", item.id),
                ));
            }
        }
    }

    let report = build_list_graph_report(lists.iter().copied());
    for id in report.cycle.unwrap_or_default() {
        issues.push(CatalogIssue::new(
            "list_cycle",
            id,
            format!("list {id} is part of a nested-list cycle"),
        ));
    }

    issues
}
