//! Table source trait and structured error types.
//!
//! The TableSource trait abstracts over the spreadsheet backend (Google
//! Sheets, in-memory fixtures) so the fetch/resolve pipeline can be driven
//! without a network and mocked for tests.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

/// One worksheet row: header-derived field name → raw cell text.
pub type Row = HashMap<String, String>;

/// The three tables a dashboard refresh needs, fetched as one unit of work.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    pub deals: Vec<Row>,
    pub stages: Vec<Row>,
    pub users: Vec<Row>,
}

/// Structured error types for remote table reads.
///
/// `RateLimited` is the one transient, retryable condition; everything else
/// aborts the fetch attempt immediately.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("rate limited by table source")]
    RateLimited,

    #[error("no credentials configured: {0}")]
    MissingCredentials(String),

    #[error("worksheet not found: {name}")]
    WorksheetNotFound { name: String },

    #[error("network unreachable: {0}")]
    Network(String),

    #[error("HTTP {status} from table source")]
    Http { status: u16 },

    #[error("response format changed: {0}")]
    BadResponse(String),
}

/// Trait for remote table sources.
///
/// Implementations handle the specifics of one backend. The retry and cache
/// layers sit above this trait — sources know nothing about either.
pub trait TableSource {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// All records of a worksheet, field names taken from its header row.
    fn worksheet(&self, name: &str) -> Result<Vec<Row>, SourceError>;

    /// A fixed cell window of a worksheet with caller-supplied field names,
    /// for reference tables that carry no header row (e.g. the 11-row stage
    /// window `A2:B12`).
    fn rows_in_range(
        &self,
        name: &str,
        range: &str,
        headers: &[&str],
    ) -> Result<Vec<Row>, SourceError>;
}

impl<T: TableSource + ?Sized> TableSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn worksheet(&self, name: &str) -> Result<Vec<Row>, SourceError> {
        (**self).worksheet(name)
    }

    fn rows_in_range(
        &self,
        name: &str,
        range: &str,
        headers: &[&str],
    ) -> Result<Vec<Row>, SourceError> {
        (**self).rows_in_range(name, range, headers)
    }
}

/// Observer for fetch progress and failures.
///
/// The emitted attempt index and count are part of the fetch contract; the
/// exact wording is not.
pub trait FetchNotices {
    /// A rate-limit was hit; the fetcher is about to wait and retry.
    /// `attempt` is 1-based.
    fn on_rate_limit_wait(&self, attempt: u32, max_attempts: u32, delay: Duration);

    /// A non-retryable source error aborted the fetch.
    fn on_source_error(&self, error: &SourceError);

    /// All retry attempts were spent without a successful fetch.
    fn on_retries_exhausted(&self, attempts: u32);
}

/// Notices sink that writes to stderr.
pub struct StderrNotices;

impl FetchNotices for StderrNotices {
    fn on_rate_limit_wait(&self, attempt: u32, max_attempts: u32, delay: Duration) {
        eprintln!(
            "API制限に達しました。{}秒待機して再試行します...（{attempt}/{max_attempts}）",
            delay.as_secs()
        );
    }

    fn on_source_error(&self, error: &SourceError) {
        eprintln!("テーブル取得エラー: {error}");
    }

    fn on_retries_exhausted(&self, _attempts: u32) {
        eprintln!("スプレッドシートの読み込みに失敗しました。後ほど再試行してください。");
    }
}

/// Notices sink that drops everything. For callers that report elsewhere.
pub struct SilentNotices;

impl FetchNotices for SilentNotices {
    fn on_rate_limit_wait(&self, _attempt: u32, _max_attempts: u32, _delay: Duration) {}
    fn on_source_error(&self, _error: &SourceError) {}
    fn on_retries_exhausted(&self, _attempts: u32) {}
}

/// In-memory table source backed by fixed rows. Used by demo mode and tests.
#[derive(Debug, Default)]
pub struct StaticSource {
    tables: HashMap<String, Vec<Row>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, rows: Vec<Row>) -> Self {
        self.tables.insert(name.to_string(), rows);
        self
    }
}

impl TableSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn worksheet(&self, name: &str) -> Result<Vec<Row>, SourceError> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::WorksheetNotFound {
                name: name.to_string(),
            })
    }

    fn rows_in_range(
        &self,
        name: &str,
        _range: &str,
        headers: &[&str],
    ) -> Result<Vec<Row>, SourceError> {
        // Fixture rows are already header-keyed; keep only the requested
        // columns so the window contract matches the remote behavior.
        let rows = self.worksheet(name)?;
        Ok(rows
            .into_iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|h| (h.to_string(), row.get(*h).cloned().unwrap_or_default()))
                    .collect()
            })
            .collect())
    }
}
