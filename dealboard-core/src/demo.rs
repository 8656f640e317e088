//! Demo data generator — a deterministic spreadsheet stand-in.
//!
//! Produces a `StaticSource` shaped exactly like the production sheets so
//! demo mode exercises the full fetch → resolve → chart pipeline without
//! credentials or a network. Seeded so every run draws the same dashboard.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::source::{Row, StaticSource};
use crate::domain::IN_FLIGHT_STAGES;
use crate::schema;

const OWNERS: [(&str, &str, &str); 4] = [
    ("101", "Hanako", "Sato"),
    ("102", "Taro", "Suzuki"),
    ("103", "Yui", "Tanaka"),
    ("104", "Kenji", ""),
];

const LEAD_PATHS: [&str; 4] = ["Web問い合わせ", "紹介", "展示会", "アウトバウンド"];

const DEAL_TYPES: [&str; 3] = ["新規", "既存深耕", "保守更新"];

const COMPANIES: [&str; 14] = [
    "青山製作所", "北川商事", "千田工業", "大和物流", "江口電機", "藤本印刷", "五十嵐建設",
    "羽田精機", "井上食品", "城西メディカル", "黒田設計", "松井運輸", "南紙業", "岡部金属",
];

fn row(pairs: &[(&str, String)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn users_rows() -> Vec<Row> {
    OWNERS
        .iter()
        .map(|(id, first, last)| {
            row(&[
                (schema::users::ID, id.to_string()),
                (schema::users::FIRST_NAME, first.to_string()),
                (schema::users::LAST_NAME, last.to_string()),
            ])
        })
        .collect()
}

fn stage_rows() -> Vec<Row> {
    // The 11-row reference window: seven in-flight stages plus the
    // terminal ones.
    let names = IN_FLIGHT_STAGES
        .iter()
        .copied()
        .chain(["クローズ", "受注", "失注", "保留"]);
    names
        .enumerate()
        .map(|(i, name)| {
            row(&[
                (schema::stages::ID, (i as i64 + 1).to_string()),
                (schema::stages::NAME, name.to_string()),
            ])
        })
        .collect()
}

fn deal_rows(seed: u64) -> Vec<Row> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(COMPANIES.len());

    for (i, company) in COMPANIES.iter().enumerate() {
        let owner = OWNERS[rng.gen_range(0..OWNERS.len())].0;
        let stage_id = rng.gen_range(1..=11u32);
        let won = rng.gen_bool(0.55);
        let amount = (rng.gen_range(3..40) * 50) as i64;

        let first_meeting = NaiveDate::from_ymd_opt(2024, rng.gen_range(1..=4), rng.gen_range(1..=28))
            .expect("generated day is valid");
        let close = first_meeting + chrono::Duration::days(rng.gen_range(30..180));
        let target = close + chrono::Duration::days(rng.gen_range(30..400));
        let report = first_meeting + chrono::Duration::days(rng.gen_range(10..25));

        let mut pairs = vec![
            (schema::deals::RECORD_ID, format!("D-{:04}", 1000 + i)),
            (schema::deals::NAME, format!("{company} 基幹システム更改")),
            (schema::deals::OWNER_ID, owner.to_string()),
            (schema::deals::STAGE_ID, stage_id.to_string()),
            (schema::deals::DEAL_TYPE, DEAL_TYPES[rng.gen_range(0..DEAL_TYPES.len())].to_string()),
            (schema::deals::LEAD_PATH, LEAD_PATHS[rng.gen_range(0..LEAD_PATHS.len())].to_string()),
            (schema::deals::FIRST_MEETING, first_meeting.to_string()),
            (schema::deals::TARGET_CLOSE, target.to_string()),
            (schema::deals::REPORT_DATE, report.to_string()),
        ];
        if won {
            pairs.push((schema::deals::OUTCOME, "受注".to_string()));
            pairs.push((schema::deals::CLOSE_DATE, close.to_string()));
            pairs.push((schema::deals::WON_AMOUNT, amount.to_string()));
        } else if rng.gen_bool(0.4) {
            pairs.push((schema::deals::OUTCOME, "失注".to_string()));
        } else {
            pairs.push((schema::deals::AMOUNT, amount.to_string()));
        }
        if rng.gen_bool(0.3) {
            let delivery = close + chrono::Duration::days(rng.gen_range(14..90));
            pairs.push((schema::deals::DELIVERY_DATE, delivery.to_string()));
        }

        rows.push(row(&pairs));
    }

    // One deliberately messy row, so demo mode also shows the coercion
    // behavior: unparseable amount and date survive as missing fields.
    rows.push(row(&[
        (schema::deals::RECORD_ID, "D-9999".to_string()),
        (schema::deals::NAME, "社名未定 新規引合".to_string()),
        (schema::deals::OWNER_ID, "not-a-number".to_string()),
        (schema::deals::STAGE_ID, "2".to_string()),
        (schema::deals::WON_AMOUNT, "未定".to_string()),
        (schema::deals::FIRST_MEETING, "来月".to_string()),
    ]));

    rows
}

/// Build the demo table source. Same seed, same dashboard.
pub fn sample_source(seed: u64) -> StaticSource {
    StaticSource::new()
        .with_table("Deals", deal_rows(seed))
        .with_table("OtherParams", stage_rows())
        .with_table("Users", users_rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::data::fetcher::Fetcher;
    use crate::data::source::SilentNotices;
    use crate::domain::STAGE_WINDOW_ROWS;
    use crate::resolve;

    #[test]
    fn demo_source_feeds_the_whole_pipeline() {
        let fetcher = Fetcher::new(sample_source(7), &DashboardConfig::default());
        let tables = fetcher.fetch(&SilentNotices).unwrap();
        assert_eq!(tables.stages.len(), STAGE_WINDOW_ROWS);
        assert_eq!(tables.users.len(), 4);

        let resolved = resolve::resolve_tables(&tables);
        assert_eq!(resolved.len(), tables.deals.len());

        // The messy row survived with missing fields.
        let messy = resolved
            .iter()
            .find(|d| d.deal.deal_id == "D-9999")
            .unwrap();
        assert_eq!(messy.deal.owner_id, None);
        assert_eq!(messy.deal.won_amount, None);
        assert_eq!(messy.deal.first_meeting_date, None);
        assert_eq!(messy.stage_name.as_deref(), Some("初回商談"));
    }

    #[test]
    fn same_seed_same_rows() {
        assert_eq!(deal_rows(42), deal_rows(42));
    }
}
