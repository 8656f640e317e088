//! Pipeline outlook report — forecast revenue grouped by owner and deal
//! type.
//!
//! A deal counts as a pipeline project when it carries a target close date
//! or a planned delivery date. Missing owners and deal types are grouped
//! under 未設定; missing amounts count as zero in the sums.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::ResolvedDeal;

const UNSET: &str = "未設定";

/// One pipeline project in the detail table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlookRow {
    pub owner: String,
    pub deal_type: String,
    pub name: String,
    /// 見込売上額（万円）. Zero when the source cell was missing.
    pub amount: f64,
    pub target_close_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
}

impl OutlookRow {
    /// Schedule note, e.g. "受注目標: 2024-07-01 / 納品予定: 2024-09-30".
    pub fn schedule_note(&self) -> String {
        let mut parts = Vec::new();
        if let Some(d) = self.target_close_date {
            parts.push(format!("受注目標: {d}"));
        }
        if let Some(d) = self.delivery_date {
            parts.push(format!("納品予定: {d}"));
        }
        parts.join(" / ")
    }
}

/// Aggregate line for one owner or one deal type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryLine {
    pub key: String,
    pub deal_count: usize,
    pub amount_sum: f64,
    /// Distinct deal types (per-owner lines) or owners (per-type lines).
    pub partner_count: usize,
}

/// Owner × deal-type cross tabulation of amount sums, with margins.
#[derive(Debug, Clone, Default)]
pub struct CrossTab {
    pub owners: Vec<String>,
    pub deal_types: Vec<String>,
    sums: BTreeMap<(String, String), f64>,
}

impl CrossTab {
    pub fn sum(&self, owner: &str, deal_type: &str) -> f64 {
        self.sums
            .get(&(owner.to_string(), deal_type.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn owner_total(&self, owner: &str) -> f64 {
        self.deal_types.iter().map(|t| self.sum(owner, t)).sum()
    }

    pub fn deal_type_total(&self, deal_type: &str) -> f64 {
        self.owners.iter().map(|o| self.sum(o, deal_type)).sum()
    }

    pub fn grand_total(&self) -> f64 {
        self.sums.values().sum()
    }
}

/// Whole-pipeline headline numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlookTotals {
    pub deal_count: usize,
    pub amount_sum: f64,
    pub owner_count: usize,
    pub deal_type_count: usize,
}

/// The full outlook report.
#[derive(Debug, Clone)]
pub struct OutlookReport {
    /// Detail rows, sorted owner asc → deal type asc → amount desc.
    pub rows: Vec<OutlookRow>,
    /// Per-owner summary, amount desc.
    pub by_owner: Vec<SummaryLine>,
    /// Per-deal-type summary, amount desc.
    pub by_deal_type: Vec<SummaryLine>,
    pub cross: CrossTab,
    pub totals: OutlookTotals,
}

impl OutlookReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn summarize(
    rows: &[OutlookRow],
    key_of: impl Fn(&OutlookRow) -> &str,
    partner_of: impl Fn(&OutlookRow) -> &str,
) -> Vec<SummaryLine> {
    let mut grouped: BTreeMap<&str, (usize, f64, BTreeSet<&str>)> = BTreeMap::new();
    for row in rows {
        let entry = grouped.entry(key_of(row)).or_default();
        entry.0 += 1;
        entry.1 += row.amount;
        entry.2.insert(partner_of(row));
    }
    let mut lines: Vec<SummaryLine> = grouped
        .into_iter()
        .map(|(key, (deal_count, amount_sum, partners))| SummaryLine {
            key: key.to_string(),
            deal_count,
            amount_sum,
            partner_count: partners.len(),
        })
        .collect();
    lines.sort_by(|a, b| b.amount_sum.total_cmp(&a.amount_sum).then(a.key.cmp(&b.key)));
    lines
}

/// Build the pipeline outlook from the resolved deal set.
pub fn outlook(resolved: &[ResolvedDeal]) -> OutlookReport {
    let mut rows: Vec<OutlookRow> = resolved
        .iter()
        .filter(|d| d.deal.target_close_date.is_some() || d.deal.delivery_date.is_some())
        .map(|d| OutlookRow {
            owner: d.owner_name.clone().unwrap_or_else(|| UNSET.to_string()),
            deal_type: d.deal.deal_type.clone().unwrap_or_else(|| UNSET.to_string()),
            name: d.deal.name.clone(),
            amount: d.deal.amount.unwrap_or(0.0),
            target_close_date: d.deal.target_close_date,
            delivery_date: d.deal.delivery_date,
        })
        .collect();

    rows.sort_by(|a, b| {
        a.owner
            .cmp(&b.owner)
            .then(a.deal_type.cmp(&b.deal_type))
            .then(b.amount.total_cmp(&a.amount))
    });

    let by_owner = summarize(&rows, |r| &r.owner, |r| &r.deal_type);
    let by_deal_type = summarize(&rows, |r| &r.deal_type, |r| &r.owner);

    let mut cross = CrossTab::default();
    let mut owners = BTreeSet::new();
    let mut deal_types = BTreeSet::new();
    for row in &rows {
        owners.insert(row.owner.clone());
        deal_types.insert(row.deal_type.clone());
        *cross
            .sums
            .entry((row.owner.clone(), row.deal_type.clone()))
            .or_insert(0.0) += row.amount;
    }
    cross.owners = owners.into_iter().collect();
    cross.deal_types = deal_types.into_iter().collect();

    let totals = OutlookTotals {
        deal_count: rows.len(),
        amount_sum: rows.iter().map(|r| r.amount).sum(),
        owner_count: cross.owners.len(),
        deal_type_count: cross.deal_types.len(),
    };

    OutlookReport {
        rows,
        by_owner,
        by_deal_type,
        cross,
        totals,
    }
}
