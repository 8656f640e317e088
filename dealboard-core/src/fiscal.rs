//! Fiscal calendar windows for the date-range filter presets.
//!
//! The business runs an April-start fiscal year: H1 is April through
//! September, H2 is October through March of the following calendar year.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Start/end dates of the fiscal year and half-year containing a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalDates {
    pub year_start: NaiveDate,
    pub year_end: NaiveDate,
    pub half_start: NaiveDate,
    pub half_end: NaiveDate,
}

/// First day of a month, with year carry for months past December.
fn month_start(year: i32, month: u32) -> NaiveDate {
    let (y, m) = if month > 12 {
        (year + 1, month - 12)
    } else {
        (year, month)
    };
    NaiveDate::from_ymd_opt(y, m, 1).expect("month start is always a valid date")
}

/// Last day of the month preceding `month` (same carry rule).
fn month_end_before(year: i32, month: u32) -> NaiveDate {
    month_start(year, month)
        .pred_opt()
        .expect("month start has a predecessor")
}

/// Compute the fiscal year and half-year windows containing `today`.
pub fn fiscal_window(today: NaiveDate, fiscal_start_month: u32) -> FiscalDates {
    let year = today.year();
    let month = today.month();

    let fy_year = if month >= fiscal_start_month {
        year
    } else {
        year - 1
    };
    let year_start = month_start(fy_year, fiscal_start_month);
    let year_end = month_end_before(fy_year + 1, fiscal_start_month);

    // First half: fiscal start month + 5 following months.
    let in_first_half = month >= fiscal_start_month && month < fiscal_start_month + 6;
    let (half_start, half_end) = if in_first_half {
        (
            month_start(year, fiscal_start_month),
            month_end_before(year, fiscal_start_month + 6),
        )
    } else {
        (
            month_start(fy_year, fiscal_start_month + 6),
            month_end_before(fy_year + 1, fiscal_start_month),
        )
    };

    FiscalDates {
        year_start,
        year_end,
        half_start,
        half_end,
    }
}

/// Date-range preset offered by the filter sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatePreset {
    /// Caller-supplied range.
    Custom(NaiveDate, NaiveDate),
    /// 今半期.
    CurrentHalf,
    /// 今年度.
    FiscalYear,
    /// 全期間 — the observed min/max of the data.
    AllTime,
}

impl DatePreset {
    /// Resolve the preset to a concrete inclusive range. `data_bounds` is
    /// the (min, max) of the filtered date column, used by AllTime.
    pub fn resolve(
        self,
        today: NaiveDate,
        fiscal_start_month: u32,
        data_bounds: Option<(NaiveDate, NaiveDate)>,
    ) -> (NaiveDate, NaiveDate) {
        let fiscal = fiscal_window(today, fiscal_start_month);
        match self {
            DatePreset::Custom(start, end) => (start, end),
            DatePreset::CurrentHalf => (fiscal.half_start, fiscal.half_end),
            DatePreset::FiscalYear => (fiscal.year_start, fiscal.year_end),
            DatePreset::AllTime => data_bounds.unwrap_or((today, today)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn june_is_first_half_of_current_fiscal_year() {
        let fiscal = fiscal_window(date(2024, 6, 15), 4);
        assert_eq!(fiscal.year_start, date(2024, 4, 1));
        assert_eq!(fiscal.year_end, date(2025, 3, 31));
        assert_eq!(fiscal.half_start, date(2024, 4, 1));
        assert_eq!(fiscal.half_end, date(2024, 9, 30));
    }

    #[test]
    fn november_is_second_half() {
        let fiscal = fiscal_window(date(2024, 11, 2), 4);
        assert_eq!(fiscal.year_start, date(2024, 4, 1));
        assert_eq!(fiscal.year_end, date(2025, 3, 31));
        assert_eq!(fiscal.half_start, date(2024, 10, 1));
        assert_eq!(fiscal.half_end, date(2025, 3, 31));
    }

    #[test]
    fn february_belongs_to_previous_fiscal_year() {
        let fiscal = fiscal_window(date(2025, 2, 10), 4);
        assert_eq!(fiscal.year_start, date(2024, 4, 1));
        assert_eq!(fiscal.year_end, date(2025, 3, 31));
        // H2 of FY2024: Oct 2024 – Mar 2025.
        assert_eq!(fiscal.half_start, date(2024, 10, 1));
        assert_eq!(fiscal.half_end, date(2025, 3, 31));
    }

    #[test]
    fn april_first_starts_everything() {
        let fiscal = fiscal_window(date(2024, 4, 1), 4);
        assert_eq!(fiscal.year_start, date(2024, 4, 1));
        assert_eq!(fiscal.half_start, date(2024, 4, 1));
    }

    #[test]
    fn march_31_ends_everything() {
        let fiscal = fiscal_window(date(2025, 3, 31), 4);
        assert_eq!(fiscal.year_end, date(2025, 3, 31));
        assert_eq!(fiscal.half_end, date(2025, 3, 31));
    }

    #[test]
    fn presets_resolve() {
        let today = date(2024, 6, 15);
        assert_eq!(
            DatePreset::FiscalYear.resolve(today, 4, None),
            (date(2024, 4, 1), date(2025, 3, 31))
        );
        assert_eq!(
            DatePreset::CurrentHalf.resolve(today, 4, None),
            (date(2024, 4, 1), date(2024, 9, 30))
        );
        assert_eq!(
            DatePreset::AllTime.resolve(today, 4, Some((date(2023, 1, 1), date(2024, 5, 1)))),
            (date(2023, 1, 1), date(2024, 5, 1))
        );
        assert_eq!(
            DatePreset::Custom(date(2024, 1, 1), date(2024, 2, 1)).resolve(today, 4, None),
            (date(2024, 1, 1), date(2024, 2, 1))
        );
    }
}
