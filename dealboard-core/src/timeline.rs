//! Timeline extractor — won deals as chronological pipeline segments.
//!
//! Feeds the pipeline chart: each qualifying deal becomes one horizontal
//! segment from first meeting to close, annotated with the won amount and
//! an optional report/proposal marker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Outcome, ResolvedDeal, Stage};

/// One deal on the pipeline chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineSegment {
    /// Display label: deal name plus lead path when known.
    pub label: String,
    /// First meeting date.
    pub start: NaiveDate,
    /// Close date.
    pub finish: NaiveDate,
    /// `finish - start` in days. Negative means the source data has a close
    /// before the first meeting; the segment is kept so the problem stays
    /// visible, it is not a fault.
    pub duration_days: i64,
    pub won_amount: Option<f64>,
    /// 報告/提案日, rendered as a third marker when present.
    pub other_date: Option<NaiveDate>,
}

/// Outcome of timeline extraction.
///
/// `Empty` is informational, not an error: the fetch succeeded and zero
/// rows satisfied the filter. A failed fetch never reaches this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TimelineResult {
    Empty,
    Segments(Vec<TimelineSegment>),
}

impl TimelineResult {
    pub fn segments(&self) -> &[TimelineSegment] {
        match self {
            TimelineResult::Empty => &[],
            TimelineResult::Segments(segments) => segments,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TimelineResult::Empty)
    }
}

/// Whether a resolved deal belongs on the pipeline chart as of `today`.
///
/// The won-but-future-target combination is intentional: the chart surfaces
/// deals that already closed while their target milestone is still ahead
/// (forecast vs. actuals), so do not "fix" the comparison.
fn qualifies(deal: &ResolvedDeal, today: NaiveDate) -> bool {
    deal.deal.outcome == Outcome::Won
        && deal.deal.target_close_date.is_some_and(|d| d >= today)
        && deal
            .stage_name
            .as_deref()
            .is_some_and(Stage::is_in_flight)
}

/// Extract pipeline segments from the resolved deal set, ordered by start
/// date ascending. Row order on the chart follows this ordering; it is a
/// display contract, not an accident.
pub fn extract_timeline(resolved: &[ResolvedDeal], today: NaiveDate) -> TimelineResult {
    let mut segments: Vec<TimelineSegment> = resolved
        .iter()
        .filter(|deal| qualifies(deal, today))
        .filter_map(|deal| {
            // A segment needs both endpoints to be drawable; rows missing
            // either date are skipped as a data-quality condition.
            let start = deal.deal.first_meeting_date?;
            let finish = deal.deal.close_date?;
            Some(TimelineSegment {
                label: deal.label(),
                start,
                finish,
                duration_days: (finish - start).num_days(),
                won_amount: deal.deal.won_amount,
                other_date: deal.deal.other_date,
            })
        })
        .collect();

    if segments.is_empty() {
        return TimelineResult::Empty;
    }
    segments.sort_by_key(|s| s.start);
    TimelineResult::Segments(segments)
}

/// Format a won amount for marker labels: `1,500万円`.
pub fn format_amount(man_yen: f64) -> String {
    let whole = man_yen.round() as i64;
    let mut digits = whole.abs().to_string();
    let mut grouped = String::new();
    while digits.len() > 3 {
        let rest = digits.split_off(digits.len() - 3);
        grouped = if grouped.is_empty() {
            rest
        } else {
            format!("{rest},{grouped}")
        };
    }
    grouped = if grouped.is_empty() {
        digits
    } else {
        format!("{digits},{grouped}")
    };
    let sign = if whole < 0 { "-" } else { "" };
    format!("{sign}{grouped}万円")
}

// ── Chart geometry ──────────────────────────────────────────────────

/// Marker role on a timeline row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerKind {
    /// First meeting — labeled with the deal label.
    Start,
    /// Close — labeled with the formatted won amount.
    Finish,
    /// Report/proposal date.
    Report,
}

/// A labeled point on a timeline row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentMarker {
    pub kind: MarkerKind,
    pub date: NaiveDate,
    pub label: String,
}

/// Drawing data for one chart row: the bar span and its markers.
/// `row` counts from the top, earliest start first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineRow {
    pub row: usize,
    pub span: (NaiveDate, NaiveDate),
    pub markers: Vec<SegmentMarker>,
}

/// Lay segments out as chart rows. Input order (ascending start) becomes
/// vertical order.
pub fn layout_rows(segments: &[TimelineSegment]) -> Vec<TimelineRow> {
    segments
        .iter()
        .enumerate()
        .map(|(row, segment)| {
            let mut markers = vec![
                SegmentMarker {
                    kind: MarkerKind::Start,
                    date: segment.start,
                    label: segment.label.clone(),
                },
                SegmentMarker {
                    kind: MarkerKind::Finish,
                    date: segment.finish,
                    label: segment
                        .won_amount
                        .map(format_amount)
                        .unwrap_or_default(),
                },
            ];
            if let Some(date) = segment.other_date {
                markers.push(SegmentMarker {
                    kind: MarkerKind::Report,
                    date,
                    label: String::new(),
                });
            }
            TimelineRow {
                row,
                span: (segment.start, segment.finish),
                markers,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Deal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn won_deal(name: &str) -> ResolvedDeal {
        ResolvedDeal {
            deal: Deal {
                deal_id: name.to_string(),
                name: name.to_string(),
                owner_id: Some(101),
                stage_id: Some(4),
                amount: None,
                won_amount: Some(1500.0),
                outcome: Outcome::Won,
                first_meeting_date: Some(date(2024, 1, 10)),
                close_date: Some(date(2024, 3, 15)),
                target_close_date: Some(date(2024, 7, 1)),
                other_date: None,
                delivery_date: None,
                lead_path: None,
                deal_type: None,
            },
            owner_name: Some("Hanako Sato".into()),
            stage_name: Some("提案書/見積提出".into()),
        }
    }

    #[test]
    fn won_future_target_in_flight_deal_is_included() {
        let today = date(2024, 6, 1);
        let result = extract_timeline(&[won_deal("A社")], today);

        let segments = result.segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, date(2024, 1, 10));
        assert_eq!(segments[0].finish, date(2024, 3, 15));
        assert_eq!(segments[0].duration_days, 65);
        assert_eq!(segments[0].won_amount, Some(1500.0));
    }

    #[test]
    fn past_target_is_excluded() {
        let today = date(2024, 6, 1);
        let mut deal = won_deal("A社");
        deal.deal.target_close_date = Some(date(2024, 5, 1));
        assert!(extract_timeline(&[deal], today).is_empty());
    }

    #[test]
    fn target_on_today_is_included() {
        let today = date(2024, 6, 1);
        let mut deal = won_deal("A社");
        deal.deal.target_close_date = Some(today);
        assert!(!extract_timeline(&[deal], today).is_empty());
    }

    #[test]
    fn lost_deal_is_excluded() {
        let today = date(2024, 6, 1);
        let mut deal = won_deal("A社");
        deal.deal.outcome = Outcome::Lost;
        assert!(extract_timeline(&[deal], today).is_empty());
    }

    #[test]
    fn closed_stage_is_excluded() {
        let today = date(2024, 6, 1);
        let mut deal = won_deal("A社");
        deal.stage_name = Some("クローズ".into());
        assert!(extract_timeline(&[deal], today).is_empty());
    }

    #[test]
    fn missing_target_is_excluded() {
        let today = date(2024, 6, 1);
        let mut deal = won_deal("A社");
        deal.deal.target_close_date = None;
        assert!(extract_timeline(&[deal], today).is_empty());
    }

    #[test]
    fn missing_endpoints_are_skipped() {
        let today = date(2024, 6, 1);
        let mut deal = won_deal("A社");
        deal.deal.first_meeting_date = None;
        assert!(extract_timeline(&[deal], today).is_empty());
    }

    #[test]
    fn rows_ordered_by_start_ascending() {
        let today = date(2024, 6, 1);
        let mut late = won_deal("遅い");
        late.deal.first_meeting_date = Some(date(2024, 2, 1));
        let mut early = won_deal("早い");
        early.deal.first_meeting_date = Some(date(2024, 1, 5));

        let result = extract_timeline(&[late, early], today);
        let segments = result.segments();
        assert_eq!(segments[0].label, "早い");
        assert_eq!(segments[1].label, "遅い");
    }

    #[test]
    fn empty_result_is_informational_not_an_error() {
        let today = date(2024, 6, 1);
        let mut deal = won_deal("A社");
        deal.deal.outcome = Outcome::Open;
        let result = extract_timeline(&[deal], today);
        assert!(result.is_empty());
        assert!(result.segments().is_empty());
    }

    #[test]
    fn negative_duration_is_kept() {
        let today = date(2024, 6, 1);
        let mut deal = won_deal("A社");
        deal.deal.first_meeting_date = Some(date(2024, 4, 1));
        deal.deal.close_date = Some(date(2024, 3, 1));
        let result = extract_timeline(&[deal], today);
        assert_eq!(result.segments()[0].duration_days, -31);
    }

    #[test]
    fn amount_formatting() {
        assert_eq!(format_amount(1500.0), "1,500万円");
        assert_eq!(format_amount(85.0), "85万円");
        assert_eq!(format_amount(1234567.0), "1,234,567万円");
        assert_eq!(format_amount(0.0), "0万円");
    }

    #[test]
    fn layout_markers() {
        let today = date(2024, 6, 1);
        let mut deal = won_deal("A社");
        deal.deal.other_date = Some(date(2024, 2, 20));
        deal.deal.lead_path = Some("Web問い合わせ".into());
        let result = extract_timeline(&[deal], today);

        let rows = layout_rows(result.segments());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row, 0);
        assert_eq!(rows[0].span, (date(2024, 1, 10), date(2024, 3, 15)));

        let markers = &rows[0].markers;
        assert_eq!(markers.len(), 3);
        assert_eq!(markers[0].kind, MarkerKind::Start);
        assert_eq!(markers[0].label, "A社 (Web問い合わせ)");
        assert_eq!(markers[1].kind, MarkerKind::Finish);
        assert_eq!(markers[1].label, "1,500万円");
        assert_eq!(markers[2].kind, MarkerKind::Report);
        assert_eq!(markers[2].date, date(2024, 2, 20));
    }
}
