//! ResolvedDeal — a Deal with its foreign keys joined to display names.

use serde::{Deserialize, Serialize};

use super::deal::Deal;

/// A deal after the owner/stage left joins.
///
/// Exactly one ResolvedDeal exists per source Deal; an unmatched owner or
/// stage id leaves the name `None`, it never drops the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedDeal {
    pub deal: Deal,
    pub owner_name: Option<String>,
    pub stage_name: Option<String>,
}

impl ResolvedDeal {
    /// Timeline label: deal name, with the lead path appended when known
    /// (e.g. "A社 基幹システム (Web問い合わせ)").
    pub fn label(&self) -> String {
        match self.deal.lead_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => format!("{} ({path})", self.deal.name),
            _ => self.deal.name.clone(),
        }
    }

    /// Whether the resolved stage is one of the in-flight pipeline stages.
    pub fn in_flight(&self) -> bool {
        self.stage_name
            .as_deref()
            .is_some_and(super::stage::Stage::is_in_flight)
    }
}
