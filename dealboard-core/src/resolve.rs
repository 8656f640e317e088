//! Identifier resolver — raw rows to typed deals with owner and stage
//! names attached.
//!
//! Field coercion never fails a row: a cell that does not parse as a
//! number or date becomes `None` and the row flows on. Joins are left
//! joins, so the resolved set always has the same cardinality as the
//! deals table.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::data::source::{Row, TableSet};
use crate::domain::{Deal, Outcome, Owner, ResolvedDeal, Stage};
use crate::schema;

/// Coerce a cell to a number. Commas are thousands separators; anything
/// that still does not parse is missing, not zero.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok().filter(|n: &f64| n.is_finite())
}

/// Coerce a cell to an integer key. Accepts a stray decimal form
/// ("101.0") since spreadsheet exports produce those.
pub fn coerce_id(raw: &str) -> Option<i64> {
    let n = coerce_number(raw)?;
    if n.fract() == 0.0 {
        Some(n as i64)
    } else {
        None
    }
}

/// Coerce a cell to a calendar date. Accepts `2024-06-01` and
/// `2024/06/01`; anything else is missing.
pub fn coerce_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(cleaned, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(cleaned, "%Y/%m/%d"))
        .ok()
}

fn cell<'a>(row: &'a Row, name: &str) -> &'a str {
    row.get(name).map(String::as_str).unwrap_or("")
}

fn optional_text(row: &Row, name: &str) -> Option<String> {
    let value = cell(row, name).trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse the users table into owners. Duplicate ids keep the first row.
pub fn parse_owners(rows: &[Row]) -> Vec<Owner> {
    let mut seen: HashSet<i64> = HashSet::new();
    let mut owners = Vec::new();
    for row in rows {
        let Some(id) = coerce_id(cell(row, schema::users::ID)) else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        owners.push(Owner {
            owner_id: id,
            full_name: Owner::full_name_of(
                cell(row, schema::users::FIRST_NAME),
                cell(row, schema::users::LAST_NAME),
            ),
        });
    }
    owners
}

/// Parse the stage window into stages. Duplicate ids keep the first row.
pub fn parse_stages(rows: &[Row]) -> Vec<Stage> {
    let mut seen: HashSet<i64> = HashSet::new();
    let mut stages = Vec::new();
    for row in rows {
        let Some(id) = coerce_id(cell(row, schema::stages::ID)) else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        stages.push(Stage {
            stage_id: id,
            stage_name: cell(row, schema::stages::NAME).trim().to_string(),
        });
    }
    stages
}

/// Parse one deals row. `index` seeds a fallback id for rows without a
/// Record ID so every deal stays addressable.
fn parse_deal(row: &Row, index: usize) -> Deal {
    let record_id = cell(row, schema::deals::RECORD_ID).trim();
    Deal {
        deal_id: if record_id.is_empty() {
            format!("row-{index}")
        } else {
            record_id.to_string()
        },
        name: cell(row, schema::deals::NAME).trim().to_string(),
        owner_id: coerce_id(cell(row, schema::deals::OWNER_ID)),
        stage_id: coerce_id(cell(row, schema::deals::STAGE_ID)),
        amount: coerce_number(cell(row, schema::deals::AMOUNT)),
        won_amount: coerce_number(cell(row, schema::deals::WON_AMOUNT)),
        outcome: Outcome::from_raw(cell(row, schema::deals::OUTCOME)),
        first_meeting_date: coerce_date(cell(row, schema::deals::FIRST_MEETING)),
        close_date: coerce_date(cell(row, schema::deals::CLOSE_DATE)),
        target_close_date: coerce_date(cell(row, schema::deals::TARGET_CLOSE)),
        other_date: coerce_date(cell(row, schema::deals::REPORT_DATE)),
        delivery_date: coerce_date(cell(row, schema::deals::DELIVERY_DATE)),
        lead_path: optional_text(row, schema::deals::LEAD_PATH),
        deal_type: optional_text(row, schema::deals::DEAL_TYPE),
    }
}

/// Resolve raw deal rows against the owner and stage reference tables.
///
/// Left-join semantics: every deal row produces exactly one resolved deal;
/// an unmatched (or missing) owner/stage id leaves the name `None`.
pub fn resolve(deals: &[Row], users: &[Row], stages: &[Row]) -> Vec<ResolvedDeal> {
    let owners_by_id: HashMap<i64, String> = {
        let mut map = HashMap::new();
        for owner in parse_owners(users) {
            // First match wins on duplicate ids.
            map.entry(owner.owner_id).or_insert(owner.full_name);
        }
        map
    };
    let stages_by_id: HashMap<i64, String> = {
        let mut map = HashMap::new();
        for stage in parse_stages(stages) {
            map.entry(stage.stage_id).or_insert(stage.stage_name);
        }
        map
    };

    deals
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let deal = parse_deal(row, i);
            let owner_name = deal.owner_id.and_then(|id| owners_by_id.get(&id).cloned());
            let stage_name = deal.stage_id.and_then(|id| stages_by_id.get(&id).cloned());
            ResolvedDeal {
                deal,
                owner_name,
                stage_name,
            }
        })
        .collect()
}

/// Convenience wrapper over a fetched table set.
pub fn resolve_tables(tables: &TableSet) -> Vec<ResolvedDeal> {
    resolve(&tables.deals, &tables.users, &tables.stages)
}
