//! Application state — single-owner, main-thread only.
//!
//! Refreshes run synchronously on the input thread: one fetch-then-render
//! cycle per keypress. The retry wait blocks the UI while it runs.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime};

use dealboard_core::aggregate::{stage_counts, CountMatrix, Selection};
use dealboard_core::config::DashboardConfig;
use dealboard_core::data::{FetchError, FetchNotices, Fetcher, SourceError, TableSource};
use dealboard_core::domain::ResolvedDeal;
use dealboard_core::report::{outlook, OutlookReport};
use dealboard_core::resolve::resolve_tables;
use dealboard_core::timeline::{extract_timeline, TimelineResult};

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Panel {
    Bars,
    Pipeline,
    Outlook,
    Help,
}

impl Panel {
    pub fn index(self) -> usize {
        match self {
            Panel::Bars => 0,
            Panel::Pipeline => 1,
            Panel::Outlook => 2,
            Panel::Help => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Bars),
            1 => Some(Panel::Pipeline),
            2 => Some(Panel::Outlook),
            3 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Bars => "Stage Bars",
            Panel::Pipeline => "Pipeline",
            Panel::Outlook => "Outlook",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % 4).unwrap()
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + 3) % 4).unwrap()
    }
}

/// Status line severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Everything one successful refresh produced.
pub struct DashboardData {
    pub resolved: Vec<ResolvedDeal>,
    pub matrix: CountMatrix,
    pub timeline: TimelineResult,
    pub outlook: OutlookReport,
    pub fetched_at: NaiveDateTime,
}

/// Cursor over the owner/stage toggle list in the bars panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterCursor {
    pub row: usize,
}

/// Notices sink that queues messages for the status line.
#[derive(Default)]
pub struct QueuedNotices {
    messages: RefCell<VecDeque<(StatusLevel, String)>>,
}

impl QueuedNotices {
    pub fn drain(&self) -> Vec<(StatusLevel, String)> {
        self.messages.borrow_mut().drain(..).collect()
    }
}

impl FetchNotices for QueuedNotices {
    fn on_rate_limit_wait(&self, attempt: u32, max_attempts: u32, delay: Duration) {
        self.messages.borrow_mut().push_back((
            StatusLevel::Warning,
            format!(
                "API制限: {}秒待機して再試行 ({attempt}/{max_attempts})",
                delay.as_secs()
            ),
        ));
    }

    fn on_source_error(&self, error: &SourceError) {
        self.messages
            .borrow_mut()
            .push_back((StatusLevel::Error, format!("取得エラー: {error}")));
    }

    fn on_retries_exhausted(&self, _attempts: u32) {
        self.messages.borrow_mut().push_back((
            StatusLevel::Error,
            "スプレッドシートの読み込みに失敗しました".to_string(),
        ));
    }
}

/// Top-level TUI state.
pub struct AppState {
    pub running: bool,
    pub active_panel: Panel,
    pub data: Option<DashboardData>,
    pub selection: Selection,
    pub cursor: FilterCursor,
    pub status: Option<(StatusLevel, String)>,
    pub today: NaiveDate,
    fetcher: Fetcher<Box<dyn TableSource>>,
    notices: QueuedNotices,
}

impl AppState {
    pub fn new(source: Box<dyn TableSource>, config: &DashboardConfig) -> Self {
        Self {
            running: true,
            active_panel: Panel::Bars,
            data: None,
            selection: Selection::default(),
            cursor: FilterCursor::default(),
            status: None,
            today: Local::now().date_naive(),
            fetcher: Fetcher::new(source, config),
            notices: QueuedNotices::default(),
        }
    }

    pub fn set_status(&mut self, level: StatusLevel, message: impl Into<String>) {
        self.status = Some((level, message.into()));
    }

    /// One full refresh cycle: fetch (cache-aware) → resolve → derive both
    /// chart inputs. On failure the previous data stays on screen and the
    /// status line reports the error; nothing renders from partial data.
    pub fn refresh(&mut self, force: bool) {
        if force {
            self.fetcher.invalidate();
        }

        let fetched = self.fetcher.fetch(&self.notices);

        // Surface queued retry notices even on the success path.
        let queued = self.notices.drain();
        if let Some((level, message)) = queued.into_iter().last() {
            self.status = Some((level, message));
        }

        let tables = match fetched {
            Ok(tables) => tables,
            Err(FetchError::RetriesExhausted { attempts }) => {
                self.set_status(
                    StatusLevel::Error,
                    format!("取得失敗: レート制限が{attempts}回続きました"),
                );
                return;
            }
            Err(FetchError::Source(e)) => {
                self.set_status(StatusLevel::Error, format!("取得失敗: {e}"));
                return;
            }
        };

        let resolved = resolve_tables(&tables);

        // A fresh data set resets the selection to everything visible.
        self.selection = Selection::all(&resolved);

        let timeline = extract_timeline(&resolved, self.today);
        let report = outlook(&resolved);
        let matrix = stage_counts(&resolved, &self.selection);

        let deal_count = resolved.len();
        let empty_timeline = timeline.is_empty();
        self.data = Some(DashboardData {
            resolved,
            matrix,
            timeline,
            outlook: report,
            fetched_at: Local::now().naive_local(),
        });

        if empty_timeline {
            self.set_status(
                StatusLevel::Info,
                format!("{deal_count}件取得。条件に一致する受注案件はありません"),
            );
        } else {
            self.set_status(StatusLevel::Info, format!("{deal_count}件取得しました"));
        }
    }

    /// Recompute the bar chart after a selection toggle.
    pub fn recompute_matrix(&mut self) {
        if let Some(data) = &mut self.data {
            data.matrix = stage_counts(&data.resolved, &self.selection);
        }
    }

    /// All toggle rows in the bars panel: owners first, then stages.
    pub fn filter_rows(&self) -> Vec<FilterRow> {
        let Some(data) = &self.data else {
            return Vec::new();
        };
        let everything = Selection::all(&data.resolved);
        let mut rows = Vec::new();
        for owner in &everything.owners {
            rows.push(FilterRow {
                label: owner.clone(),
                kind: FilterKind::Owner,
                selected: self.selection.owners.contains(owner),
            });
        }
        for stage in &everything.stages {
            rows.push(FilterRow {
                label: stage.clone(),
                kind: FilterKind::Stage,
                selected: self.selection.stages.contains(stage),
            });
        }
        rows
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.filter_rows().len();
        if len == 0 {
            return;
        }
        let row = self.cursor.row as isize + delta;
        self.cursor.row = row.rem_euclid(len as isize) as usize;
    }

    /// Toggle the filter row under the cursor and rebuild the bar chart.
    pub fn toggle_selected(&mut self) {
        let rows = self.filter_rows();
        let Some(row) = rows.get(self.cursor.row) else {
            return;
        };
        let set = match row.kind {
            FilterKind::Owner => &mut self.selection.owners,
            FilterKind::Stage => &mut self.selection.stages,
        };
        if !set.remove(&row.label) {
            set.insert(row.label.clone());
        }
        self.recompute_matrix();
    }
}

/// Kind of a toggle row in the filter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Owner,
    Stage,
}

/// One toggle row in the filter list.
#[derive(Debug, Clone)]
pub struct FilterRow {
    pub label: String,
    pub kind: FilterKind,
    pub selected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealboard_core::demo::sample_source;

    fn demo_app() -> AppState {
        let config = DashboardConfig::default();
        AppState::new(Box::new(sample_source(7)), &config)
    }

    #[test]
    fn refresh_populates_dashboard_data() {
        let mut app = demo_app();
        app.refresh(false);

        let data = app.data.as_ref().expect("demo refresh succeeds");
        assert!(!data.resolved.is_empty());
        assert!(!app.selection.owners.is_empty());
    }

    #[test]
    fn toggling_a_filter_changes_the_matrix() {
        let mut app = demo_app();
        app.refresh(false);

        let before = app.data.as_ref().unwrap().matrix.grand_total();
        assert!(before > 0);

        // Cursor starts on the first owner; toggling it off removes
        // that owner's bar.
        app.toggle_selected();
        let after = app.data.as_ref().unwrap().matrix.grand_total();
        assert!(after < before);
    }

    #[test]
    fn cursor_wraps_around_the_filter_list() {
        let mut app = demo_app();
        app.refresh(false);

        app.move_cursor(-1);
        assert_eq!(app.cursor.row, app.filter_rows().len() - 1);
        app.move_cursor(1);
        assert_eq!(app.cursor.row, 0);
    }

    #[test]
    fn panel_cycle_is_total() {
        let mut panel = Panel::Bars;
        for _ in 0..4 {
            panel = panel.next();
        }
        assert_eq!(panel, Panel::Bars);
        assert_eq!(Panel::Bars.prev(), Panel::Help);
    }
}
