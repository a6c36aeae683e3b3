//! Batch fetch orchestration.
//!
//! Walks a symbol list, skips symbols the cache already fully covers
//! (unless forced), fetches the rest through a [`CandleProvider`], and
//! stores each result. One symbol failing never aborts the batch; failures
//! are collected in the summary.

use chrono::{DateTime, Utc};

use super::cache::{CandleCache, CoverageResult};
use super::provider::{CandleProvider, DataError, DownloadProgress};

/// Outcome of a multi-symbol fetch.
#[derive(Debug)]
pub struct FetchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<(String, DataError)>,
}

impl FetchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Fetch and cache candles for every symbol in `symbols`.
///
/// With `force` unset, a symbol whose cached range already covers
/// `[start, end]` is reported as succeeded without touching the provider.
#[allow(clippy::too_many_arguments)]
pub fn fetch_symbols(
    provider: &dyn CandleProvider,
    cache: &CandleCache,
    symbols: &[String],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: &str,
    force: bool,
    progress: &dyn DownloadProgress,
) -> FetchSummary {
    let total = symbols.len();
    let mut summary = FetchSummary {
        total,
        succeeded: 0,
        failed: 0,
        errors: Vec::new(),
    };

    for (index, symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, index, total);

        let covered = !force
            && matches!(
                cache.covers_range(symbol, start, end),
                CoverageResult::FullyCovered
            );

        let result: Result<(), DataError> = if covered {
            Ok(())
        } else {
            provider.fetch(symbol, start, end).and_then(|fetched| {
                cache
                    .store(symbol, interval, fetched.source, &fetched.candles)
                    .map(|_| ())
            })
        };

        progress.on_complete(symbol, index, total, &result);
        match result {
            Ok(()) => summary.succeeded += 1,
            Err(err) => {
                summary.failed += 1;
                summary.errors.push((symbol.clone(), err));
            }
        }
    }

    progress.on_batch_complete(summary.succeeded, summary.failed, total);
    summary
}
