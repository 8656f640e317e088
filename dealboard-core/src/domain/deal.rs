//! Deal — one sales opportunity row, after field coercion.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Won/lost state, mapped from the free-text 受注/失注 column at the
/// ingestion boundary so nothing downstream matches on raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
    Open,
    Unknown,
}

impl Outcome {
    /// Map the raw cell text to an outcome. Empty means the deal is still
    /// open; anything unrecognized is kept distinct from Open.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "受注" => Outcome::Won,
            "失注" => Outcome::Lost,
            "" => Outcome::Open,
            _ => Outcome::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Won => "受注",
            Outcome::Lost => "失注",
            Outcome::Open => "商談中",
            Outcome::Unknown => "不明",
        }
    }
}

/// A sales opportunity.
///
/// Every fallible field is an `Option`: a cell that fails numeric or date
/// parsing becomes `None` and the row survives. Predicates downstream must
/// handle the missing case explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub deal_id: String,
    pub name: String,

    // ── Foreign keys ──
    pub owner_id: Option<i64>,
    pub stage_id: Option<i64>,

    // ── Money (万円) ──
    pub amount: Option<f64>,
    pub won_amount: Option<f64>,

    // ── Lifecycle ──
    pub outcome: Outcome,
    pub first_meeting_date: Option<NaiveDate>,
    pub close_date: Option<NaiveDate>,
    pub target_close_date: Option<NaiveDate>,
    /// 報告/提案日 — shown as a third marker on the timeline when present.
    pub other_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,

    // ── Annotations ──
    pub lead_path: Option<String>,
    pub deal_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_mapping() {
        assert_eq!(Outcome::from_raw("受注"), Outcome::Won);
        assert_eq!(Outcome::from_raw("失注"), Outcome::Lost);
        assert_eq!(Outcome::from_raw(""), Outcome::Open);
        assert_eq!(Outcome::from_raw("  受注 "), Outcome::Won);
        assert_eq!(Outcome::from_raw("ペンディング"), Outcome::Unknown);
    }
}
