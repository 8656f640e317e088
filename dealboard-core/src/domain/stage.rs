//! Stage — a named phase in the sales pipeline, keyed by a small numeric id.

use serde::{Deserialize, Serialize};

/// Number of rows in the fixed stage reference window (OtherParams!A2:B12).
/// Stage ids outside this window resolve to missing.
pub const STAGE_WINDOW_ROWS: usize = 11;

/// Stage names counted as "in flight" for the pipeline timeline. Deals in
/// any other stage (クローズ, 受注, 失注, 保留) never appear there.
pub const IN_FLIGHT_STAGES: [&str; 7] = [
    "アポ取得",
    "初回商談",
    "ヒアリング",
    "提案書/見積提出",
    "デモ/トライアル",
    "最終交渉",
    "契約手続き",
];

/// A pipeline stage from the OtherParams sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub stage_id: i64,
    pub stage_name: String,
}

impl Stage {
    pub fn is_in_flight(name: &str) -> bool {
        IN_FLIGHT_STAGES.contains(&name)
    }
}
