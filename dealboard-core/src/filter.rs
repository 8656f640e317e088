//! Row filters for the dashboard sidebar: outcome, lead path, owners,
//! and a date window over a chosen date column.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Outcome, ResolvedDeal};

/// Which date column a window filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateField {
    FirstMeeting,
    Close,
    TargetClose,
    Delivery,
}

impl DateField {
    pub fn of(self, deal: &ResolvedDeal) -> Option<NaiveDate> {
        match self {
            DateField::FirstMeeting => deal.deal.first_meeting_date,
            DateField::Close => deal.deal.close_date,
            DateField::TargetClose => deal.deal.target_close_date,
            DateField::Delivery => deal.deal.delivery_date,
        }
    }
}

/// Sidebar filter state. `None` on a field means "すべて" (no restriction).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealFilter {
    pub outcome: Option<Outcome>,
    pub lead_path: Option<String>,
    pub owners: Option<BTreeSet<String>>,
    pub date_field: DateField,
    /// Inclusive window on `date_field`.
    pub range: Option<(NaiveDate, NaiveDate)>,
}

impl DealFilter {
    /// A filter that keeps everything, windowed on the close date.
    pub fn unrestricted() -> Self {
        Self {
            outcome: None,
            lead_path: None,
            owners: None,
            date_field: DateField::Close,
            range: None,
        }
    }

    pub fn matches(&self, deal: &ResolvedDeal) -> bool {
        if let Some(outcome) = self.outcome {
            if deal.deal.outcome != outcome {
                return false;
            }
        }
        if let Some(lead) = &self.lead_path {
            if deal.deal.lead_path.as_deref() != Some(lead.as_str()) {
                return false;
            }
        }
        if let Some(owners) = &self.owners {
            match &deal.owner_name {
                Some(name) if owners.contains(name) => {}
                _ => return false,
            }
        }
        if let Some((start, end)) = self.range {
            // A missing date cannot satisfy a window.
            match self.date_field.of(deal) {
                Some(date) if date >= start && date <= end => {}
                _ => return false,
            }
        }
        true
    }

    pub fn apply<'a>(&self, resolved: &'a [ResolvedDeal]) -> Vec<&'a ResolvedDeal> {
        resolved.iter().filter(|d| self.matches(d)).collect()
    }
}

/// Observed (min, max) of a date column across the resolved set, for the
/// 全期間 preset. `None` when no row carries the date.
pub fn date_bounds(resolved: &[ResolvedDeal], field: DateField) -> Option<(NaiveDate, NaiveDate)> {
    let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
    for deal in resolved {
        let Some(date) = field.of(deal) else { continue };
        bounds = Some(match bounds {
            None => (date, date),
            Some((min, max)) => (min.min(date), max.max(date)),
        });
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Deal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn deal(
        outcome: Outcome,
        owner: Option<&str>,
        lead: Option<&str>,
        close: Option<NaiveDate>,
    ) -> ResolvedDeal {
        ResolvedDeal {
            deal: Deal {
                deal_id: "x".into(),
                name: "案件".into(),
                owner_id: None,
                stage_id: None,
                amount: None,
                won_amount: None,
                outcome,
                first_meeting_date: None,
                close_date: close,
                target_close_date: None,
                other_date: None,
                delivery_date: None,
                lead_path: lead.map(Into::into),
                deal_type: None,
            },
            owner_name: owner.map(Into::into),
            stage_name: None,
        }
    }

    #[test]
    fn unrestricted_keeps_everything() {
        let rows = vec![
            deal(Outcome::Won, None, None, None),
            deal(Outcome::Lost, Some("Sato"), Some("紹介"), Some(date(2024, 5, 1))),
        ];
        assert_eq!(DealFilter::unrestricted().apply(&rows).len(), 2);
    }

    #[test]
    fn outcome_and_lead_filters() {
        let rows = vec![
            deal(Outcome::Won, None, Some("紹介"), None),
            deal(Outcome::Won, None, Some("Web問い合わせ"), None),
            deal(Outcome::Lost, None, Some("紹介"), None),
        ];
        let mut filter = DealFilter::unrestricted();
        filter.outcome = Some(Outcome::Won);
        filter.lead_path = Some("紹介".into());
        assert_eq!(filter.apply(&rows).len(), 1);
    }

    #[test]
    fn owner_filter_rejects_unresolved_names() {
        let rows = vec![
            deal(Outcome::Won, Some("Sato"), None, None),
            deal(Outcome::Won, None, None, None),
        ];
        let mut filter = DealFilter::unrestricted();
        filter.owners = Some(["Sato".to_string()].into());
        assert_eq!(filter.apply(&rows).len(), 1);
    }

    #[test]
    fn date_window_is_inclusive_and_missing_dates_fail() {
        let rows = vec![
            deal(Outcome::Won, None, None, Some(date(2024, 4, 1))),
            deal(Outcome::Won, None, None, Some(date(2024, 9, 30))),
            deal(Outcome::Won, None, None, Some(date(2024, 10, 1))),
            deal(Outcome::Won, None, None, None),
        ];
        let mut filter = DealFilter::unrestricted();
        filter.range = Some((date(2024, 4, 1), date(2024, 9, 30)));
        assert_eq!(filter.apply(&rows).len(), 2);
    }

    #[test]
    fn bounds_over_present_dates() {
        let rows = vec![
            deal(Outcome::Won, None, None, Some(date(2024, 5, 2))),
            deal(Outcome::Won, None, None, None),
            deal(Outcome::Won, None, None, Some(date(2024, 1, 15))),
        ];
        assert_eq!(
            date_bounds(&rows, DateField::Close),
            Some((date(2024, 1, 15), date(2024, 5, 2)))
        );
        assert_eq!(date_bounds(&rows, DateField::Delivery), None);
    }
}
