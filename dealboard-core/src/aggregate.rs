//! Deal-count aggregation for the stacked bar chart.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::ResolvedDeal;

/// Inclusion filters supplied by the UI layer: a row is counted iff its
/// resolved owner name and stage name are both selected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selection {
    pub owners: BTreeSet<String>,
    pub stages: BTreeSet<String>,
}

impl Selection {
    /// Select every owner and stage name present in the resolved set.
    pub fn all(resolved: &[ResolvedDeal]) -> Self {
        let mut selection = Selection::default();
        for deal in resolved {
            if let Some(owner) = &deal.owner_name {
                selection.owners.insert(owner.clone());
            }
            if let Some(stage) = &deal.stage_name {
                selection.stages.insert(stage.clone());
            }
        }
        selection
    }

    fn includes(&self, deal: &ResolvedDeal) -> bool {
        let owner_in = deal
            .owner_name
            .as_ref()
            .is_some_and(|o| self.owners.contains(o));
        let stage_in = deal
            .stage_name
            .as_ref()
            .is_some_and(|s| self.stages.contains(s));
        owner_in && stage_in
    }
}

/// Grouped count table: rows = owners, columns = stages, values = deal
/// counts. Axes are sorted ascending for stable display.
#[derive(Debug, Clone, Default)]
pub struct CountMatrix {
    pub owners: Vec<String>,
    pub stages: Vec<String>,
    counts: BTreeMap<(String, String), u64>,
}

impl CountMatrix {
    pub fn count(&self, owner: &str, stage: &str) -> u64 {
        self.counts
            .get(&(owner.to_string(), stage.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Total deals for one owner across all stages (one stacked bar).
    pub fn owner_total(&self, owner: &str) -> u64 {
        self.stages.iter().map(|s| self.count(owner, s)).sum()
    }

    pub fn grand_total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Count deals per (owner, stage) pair under the given selection.
///
/// Deals with an unresolved owner or stage never appear: an absent name
/// cannot be a member of the selection set.
pub fn stage_counts(resolved: &[ResolvedDeal], selection: &Selection) -> CountMatrix {
    let mut matrix = CountMatrix::default();
    let mut owners = BTreeSet::new();
    let mut stages = BTreeSet::new();

    for deal in resolved {
        if !selection.includes(deal) {
            continue;
        }
        let owner = deal.owner_name.clone().unwrap_or_default();
        let stage = deal.stage_name.clone().unwrap_or_default();
        owners.insert(owner.clone());
        stages.insert(stage.clone());
        *matrix.counts.entry((owner, stage)).or_insert(0) += 1;
    }

    matrix.owners = owners.into_iter().collect();
    matrix.stages = stages.into_iter().collect();
    matrix
}
