//! Resilient fetcher — bounded retry on rate limits plus a single-slot
//! TTL cache in front of the table source.
//!
//! One fetch is one unit of work: the deals, stage, and user tables are
//! read together and any failure fails the whole attempt. Rate limits are
//! the only retryable condition; anything else aborts immediately.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use thiserror::Error;

use super::source::{FetchNotices, SourceError, TableSet, TableSource};
use crate::config::DashboardConfig;
use crate::schema;

/// Terminal fetch failure. Distinct from an empty-but-valid result: callers
/// that get `Ok` with no qualifying rows render an informational message,
/// callers that get `Err` halt the cycle without rendering.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("table source still rate limited after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Retry policy: how many attempts, how long to wait between them, and
/// which errors are worth waiting for.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Only rate limits are transient; everything else aborts the fetch.
    pub fn is_retryable(&self, error: &SourceError) -> bool {
        matches!(error, SourceError::RateLimited)
    }
}

/// Run one fallible operation under a retry policy.
///
/// Emits one wait notice per rate-limited attempt (1-based index), sleeps
/// the fixed delay, and gives up with `RetriesExhausted` once the attempts
/// are spent. The sleep blocks the calling thread.
pub fn run_with_retry<T>(
    policy: &RetryPolicy,
    notices: &dyn FetchNotices,
    mut op: impl FnMut() -> Result<T, SourceError>,
) -> Result<T, FetchError> {
    let mut failures = 0;
    loop {
        if failures >= policy.max_attempts {
            notices.on_retries_exhausted(failures);
            return Err(FetchError::RetriesExhausted { attempts: failures });
        }
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if policy.is_retryable(&e) => {
                failures += 1;
                notices.on_rate_limit_wait(failures, policy.max_attempts, policy.delay);
                std::thread::sleep(policy.delay);
            }
            Err(e) => {
                notices.on_source_error(&e);
                return Err(FetchError::Source(e));
            }
        }
    }
}

/// Time source for the cache, injectable so expiry is testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Single-slot result cache with time-based expiry.
///
/// The fetch takes no arguments, so the key space is a single slot. Within
/// the TTL window `get_or_fetch` returns the cached value without running
/// the producer; a failed produce caches nothing.
pub struct SlotCache<T> {
    ttl: Duration,
    clock: Box<dyn Clock>,
    slot: Mutex<Option<(Instant, T)>>,
}

impl<T: Clone> SlotCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Box::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value if fresh, otherwise run the producer and
    /// cache its success.
    pub fn get_or_fetch<E>(
        &self,
        produce: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let now = self.clock.now();
        {
            let slot = self.slot.lock().unwrap();
            if let Some((stored_at, value)) = slot.as_ref() {
                if now.duration_since(*stored_at) < self.ttl {
                    return Ok(value.clone());
                }
            }
        }

        let value = produce()?;
        *self.slot.lock().unwrap() = Some((now, value.clone()));
        Ok(value)
    }

    /// Drop the cached value so the next call refetches.
    pub fn invalidate(&self) {
        *self.slot.lock().unwrap() = None;
    }
}

/// Resilient fetcher: retry + cache around a table source.
pub struct Fetcher<S: TableSource> {
    source: S,
    policy: RetryPolicy,
    cache: SlotCache<TableSet>,
    deals_sheet: String,
    stages_sheet: String,
    users_sheet: String,
    stage_range: String,
}

impl<S: TableSource> Fetcher<S> {
    pub fn new(source: S, config: &DashboardConfig) -> Self {
        Self::with_clock(source, config, Box::new(SystemClock))
    }

    pub fn with_clock(source: S, config: &DashboardConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            source,
            policy: RetryPolicy {
                max_attempts: config.retry.max_attempts,
                delay: config.retry.delay(),
            },
            cache: SlotCache::with_clock(config.cache_ttl(), clock),
            deals_sheet: config.worksheets.deals.clone(),
            stages_sheet: config.worksheets.stages.clone(),
            users_sheet: config.worksheets.users.clone(),
            stage_range: config.stage_range.clone(),
        }
    }

    /// Fetch the three tables, serving from cache within the TTL window.
    pub fn fetch(&self, notices: &dyn FetchNotices) -> Result<TableSet, FetchError> {
        self.cache
            .get_or_fetch(|| run_with_retry(&self.policy, notices, || self.read_tables()))
    }

    /// Force the next fetch to hit the source.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    /// The retried unit of work: all three reads, or nothing.
    fn read_tables(&self) -> Result<TableSet, SourceError> {
        let deals = self.source.worksheet(&self.deals_sheet)?;
        let stages = self.source.rows_in_range(
            &self.stages_sheet,
            &self.stage_range,
            &[schema::stages::ID, schema::stages::NAME],
        )?;
        let users = self.source.worksheet(&self.users_sheet)?;
        log::debug!(
            "fetched {} deals, {} stages, {} users",
            deals.len(),
            stages.len(),
            users.len()
        );
        Ok(TableSet {
            deals,
            stages,
            users,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::Row;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Notices sink that records every callback.
    #[derive(Default)]
    struct RecordingNotices {
        waits: Mutex<Vec<(u32, u32)>>,
        source_errors: AtomicU32,
        exhausted: Mutex<Option<u32>>,
    }

    impl FetchNotices for RecordingNotices {
        fn on_rate_limit_wait(&self, attempt: u32, max_attempts: u32, _delay: Duration) {
            self.waits.lock().unwrap().push((attempt, max_attempts));
        }

        fn on_source_error(&self, _error: &SourceError) {
            self.source_errors.fetch_add(1, Ordering::Relaxed);
        }

        fn on_retries_exhausted(&self, attempts: u32) {
            *self.exhausted.lock().unwrap() = Some(attempts);
        }
    }

    /// Source that rate-limits the first N worksheet reads, then succeeds.
    struct FlakySource {
        rate_limits_left: AtomicU32,
        calls: AtomicU32,
    }

    impl FlakySource {
        fn new(rate_limits: u32) -> Self {
            Self {
                rate_limits_left: AtomicU32::new(rate_limits),
                calls: AtomicU32::new(0),
            }
        }
    }

    impl TableSource for FlakySource {
        fn name(&self) -> &str {
            "flaky"
        }

        fn worksheet(&self, _name: &str) -> Result<Vec<Row>, SourceError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            let left = self.rate_limits_left.load(Ordering::Relaxed);
            if left > 0 {
                self.rate_limits_left.store(left - 1, Ordering::Relaxed);
                return Err(SourceError::RateLimited);
            }
            Ok(vec![Row::new()])
        }

        fn rows_in_range(
            &self,
            name: &str,
            _range: &str,
            _headers: &[&str],
        ) -> Result<Vec<Row>, SourceError> {
            self.worksheet(name)
        }
    }

    #[derive(Clone)]
    struct TestClock {
        base: Instant,
        offset: Arc<Mutex<Duration>>,
    }

    impl TestClock {
        fn new() -> Self {
            Self {
                base: Instant::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }

        fn advance(&self, by: Duration) {
            *self.offset.lock().unwrap() += by;
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            self.base + *self.offset.lock().unwrap()
        }
    }

    fn fast_config() -> DashboardConfig {
        let mut cfg = DashboardConfig::default();
        cfg.retry.delay_secs = 0;
        cfg
    }

    #[test]
    fn rate_limited_twice_then_success() {
        let fetcher = Fetcher::new(FlakySource::new(2), &fast_config());
        let notices = RecordingNotices::default();

        let result = fetcher.fetch(&notices);
        assert!(result.is_ok());

        // The wait notice fired exactly twice, with 1-based attempt indices.
        let waits = notices.waits.lock().unwrap();
        assert_eq!(*waits, vec![(1, 3), (2, 3)]);
        assert!(notices.exhausted.lock().unwrap().is_none());
    }

    #[test]
    fn exhaustion_after_max_attempts() {
        let fetcher = Fetcher::new(FlakySource::new(u32::MAX), &fast_config());
        let notices = RecordingNotices::default();

        let result = fetcher.fetch(&notices);
        assert!(matches!(
            result,
            Err(FetchError::RetriesExhausted { attempts: 3 })
        ));
        assert_eq!(notices.waits.lock().unwrap().len(), 3);
        assert_eq!(*notices.exhausted.lock().unwrap(), Some(3));
    }

    #[test]
    fn non_rate_limit_error_aborts_without_retry() {
        struct BrokenSource;
        impl TableSource for BrokenSource {
            fn name(&self) -> &str {
                "broken"
            }
            fn worksheet(&self, _name: &str) -> Result<Vec<Row>, SourceError> {
                Err(SourceError::Http { status: 500 })
            }
            fn rows_in_range(
                &self,
                _name: &str,
                _range: &str,
                _headers: &[&str],
            ) -> Result<Vec<Row>, SourceError> {
                Err(SourceError::Http { status: 500 })
            }
        }

        let fetcher = Fetcher::new(BrokenSource, &fast_config());
        let notices = RecordingNotices::default();

        let result = fetcher.fetch(&notices);
        assert!(matches!(
            result,
            Err(FetchError::Source(SourceError::Http { status: 500 }))
        ));
        assert!(notices.waits.lock().unwrap().is_empty());
        assert_eq!(notices.source_errors.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn second_fetch_within_ttl_hits_cache() {
        let clock = TestClock::new();
        let source = FlakySource::new(0);
        let fetcher = Fetcher::with_clock(source, &fast_config(), Box::new(clock.clone()));
        let notices = RecordingNotices::default();

        fetcher.fetch(&notices).unwrap();
        fetcher.fetch(&notices).unwrap();

        // One unit of work = three worksheet reads; a second batch would be six.
        assert_eq!(fetcher.source.calls.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn fetch_after_ttl_expiry_refetches() {
        let clock = TestClock::new();
        let source = FlakySource::new(0);
        let fetcher = Fetcher::with_clock(source, &fast_config(), Box::new(clock.clone()));
        let notices = RecordingNotices::default();

        fetcher.fetch(&notices).unwrap();
        clock.advance(Duration::from_secs(301));
        fetcher.fetch(&notices).unwrap();

        assert_eq!(fetcher.source.calls.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn failed_fetch_is_not_cached() {
        let source = FlakySource::new(u32::MAX);
        let fetcher = Fetcher::new(source, &fast_config());
        let notices = RecordingNotices::default();

        assert!(fetcher.fetch(&notices).is_err());

        // Stop rate-limiting; a new fetch must reach the source again.
        fetcher.source.rate_limits_left.store(0, Ordering::Relaxed);
        assert!(fetcher.fetch(&notices).is_ok());
    }

    #[test]
    fn invalidate_forces_refetch() {
        let fetcher = Fetcher::new(FlakySource::new(0), &fast_config());
        let notices = RecordingNotices::default();

        fetcher.fetch(&notices).unwrap();
        fetcher.invalidate();
        fetcher.fetch(&notices).unwrap();

        assert_eq!(fetcher.source.calls.load(Ordering::Relaxed), 6);
    }
}
