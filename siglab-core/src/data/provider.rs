//! Candle provider trait and structured error types.
//!
//! The CandleProvider trait abstracts over candle sources (KuCoin, CSV
//! import, synthetic) so callers can swap implementations and tests can
//! substitute stubs. The cache layer sits above this trait; providers do not
//! know about the cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Candle;

/// Structured error types for data operations.
///
/// Designed to be displayable in CLI output without further context.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("ingest failed: {0}")]
    IngestFailed(String),

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("no cached data for symbol '{symbol}': run `fetch {symbol}` first")]
    NoCachedData { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Where a candle series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    KuCoin,
    CsvImport,
    Cache,
    Synthetic,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KuCoin => "kucoin",
            Self::CsvImport => "csv_import",
            Self::Cache => "cache",
            Self::Synthetic => "synthetic",
        }
    }
}

/// Result of a successful fetch for a single symbol.
///
/// Candles are sorted oldest-first with unique timestamps.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub candles: Vec<Candle>,
    pub source: DataSource,
}

/// Trait for candle providers (KuCoin, synthetic, test stubs).
pub trait CandleProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch candles for a symbol over a UTC time range.
    fn fetch(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<FetchResult, DataError>;
}

/// Progress callback for multi-symbol operations.
pub trait DownloadProgress: Send {
    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol fetch completes.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: &Result<(), DataError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl DownloadProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: &Result<(), DataError>,
    ) {
        match result {
            Ok(()) => println!("  OK: {symbol}"),
            Err(e) => println!("  FAIL: {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nFetch complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}
