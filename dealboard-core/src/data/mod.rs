//! Table retrieval: source abstraction, Sheets backend, retry and caching.

pub mod fetcher;
pub mod sheets;
pub mod source;

pub use fetcher::{Clock, FetchError, Fetcher, RetryPolicy, SlotCache, SystemClock};
pub use sheets::{SheetsAuth, SheetsSource, TOKEN_ENV_VAR};
pub use source::{
    FetchNotices, Row, SilentNotices, SourceError, StaticSource, StderrNotices, TableSet,
    TableSource,
};
