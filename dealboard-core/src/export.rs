//! CSV export of resolved deals and the outlook detail table.

use std::io::Write;

use crate::domain::ResolvedDeal;
use crate::report::OutlookRow;

fn opt_str(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn opt_num(value: Option<f64>) -> String {
    value.map(|n| format!("{n}")).unwrap_or_default()
}

fn opt_date(value: Option<chrono::NaiveDate>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

/// Write the resolved deal set as CSV. Missing fields export as empty
/// cells, matching how they arrived.
pub fn write_resolved_csv<W: Write>(out: W, resolved: &[ResolvedDeal]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record([
        "deal_id",
        "deal_name",
        "owner",
        "stage",
        "outcome",
        "amount",
        "won_amount",
        "first_meeting_date",
        "close_date",
        "target_close_date",
        "report_date",
        "delivery_date",
        "lead_path",
        "deal_type",
    ])?;

    for r in resolved {
        wtr.write_record([
            r.deal.deal_id.as_str(),
            r.deal.name.as_str(),
            opt_str(&r.owner_name),
            opt_str(&r.stage_name),
            r.deal.outcome.label(),
            &opt_num(r.deal.amount),
            &opt_num(r.deal.won_amount),
            &opt_date(r.deal.first_meeting_date),
            &opt_date(r.deal.close_date),
            &opt_date(r.deal.target_close_date),
            &opt_date(r.deal.other_date),
            &opt_date(r.deal.delivery_date),
            opt_str(&r.deal.lead_path),
            opt_str(&r.deal.deal_type),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the outlook detail rows as CSV.
pub fn write_outlook_csv<W: Write>(out: W, rows: &[OutlookRow]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["owner", "deal_type", "deal_name", "amount", "schedule"])?;
    for row in rows {
        wtr.write_record([
            row.owner.as_str(),
            row.deal_type.as_str(),
            row.name.as_str(),
            &format!("{}", row.amount),
            &row.schedule_note(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Deal, Outcome};
    use chrono::NaiveDate;

    #[test]
    fn resolved_csv_roundtrips_missing_fields_as_empty() {
        let resolved = vec![ResolvedDeal {
            deal: Deal {
                deal_id: "D-1000".into(),
                name: "青山製作所 基幹システム更改".into(),
                owner_id: Some(101),
                stage_id: Some(4),
                amount: None,
                won_amount: Some(1500.0),
                outcome: Outcome::Won,
                first_meeting_date: NaiveDate::from_ymd_opt(2024, 1, 10),
                close_date: NaiveDate::from_ymd_opt(2024, 3, 15),
                target_close_date: None,
                other_date: None,
                delivery_date: None,
                lead_path: Some("紹介".into()),
                deal_type: None,
            },
            owner_name: Some("Hanako Sato".into()),
            stage_name: Some("提案書/見積提出".into()),
        }];

        let mut buf = Vec::new();
        write_resolved_csv(&mut buf, &resolved).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("deal_id,"));
        let data = lines.next().unwrap();
        assert!(data.contains("Hanako Sato"));
        assert!(data.contains("提案書/見積提出"));
        assert!(data.contains("1500"));
        // amount missing → empty cell between outcome and won_amount
        assert!(data.contains("受注,,1500"));
    }

    #[test]
    fn outlook_csv_has_schedule_notes() {
        let rows = vec![OutlookRow {
            owner: "Hanako Sato".into(),
            deal_type: "新規".into(),
            name: "青山製作所".into(),
            amount: 400.0,
            target_close_date: NaiveDate::from_ymd_opt(2024, 7, 1),
            delivery_date: None,
        }];

        let mut buf = Vec::new();
        write_outlook_csv(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("受注目標: 2024-07-01"));
    }
}
