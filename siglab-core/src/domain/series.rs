//! Series validation — structural checks applied before any scan.
//!
//! A structurally broken series (disorder, duplicates, mixed symbols) is the
//! only fatal input condition. Everything else — warm-up, horizon, malformed
//! bars — degrades to per-reason skip counts inside the scan itself.

use super::candle::Candle;
use super::signal_bar::SignalBar;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Structural defects that make a series unusable for scanning.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("timestamps out of order at index {index}: {current} before {previous}")]
    OutOfOrder {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },
    #[error("duplicate timestamp at index {index}: {timestamp}")]
    DuplicateTimestamp {
        index: usize,
        timestamp: DateTime<Utc>,
    },
    #[error("mixed symbols in one series at index {index}: {first} then {other}")]
    MixedSymbols {
        index: usize,
        first: String,
        other: String,
    },
}

/// Checks strict chronological order and the single-symbol invariant.
pub fn validate_candles(candles: &[Candle]) -> Result<(), SeriesError> {
    validate_inner(candles.iter().map(|c| (c.symbol.as_str(), c.timestamp)))
}

/// Same checks over an enriched series.
pub fn validate_bars(bars: &[SignalBar]) -> Result<(), SeriesError> {
    validate_inner(
        bars.iter()
            .map(|b| (b.candle.symbol.as_str(), b.candle.timestamp)),
    )
}

fn validate_inner<'a, I>(items: I) -> Result<(), SeriesError>
where
    I: Iterator<Item = (&'a str, DateTime<Utc>)>,
{
    let mut prev: Option<(&str, DateTime<Utc>)> = None;
    for (index, (symbol, timestamp)) in items.enumerate() {
        if let Some((first_symbol, prev_ts)) = prev {
            if symbol != first_symbol {
                return Err(SeriesError::MixedSymbols {
                    index,
                    first: first_symbol.to_string(),
                    other: symbol.to_string(),
                });
            }
            if timestamp == prev_ts {
                return Err(SeriesError::DuplicateTimestamp { index, timestamp });
            }
            if timestamp < prev_ts {
                return Err(SeriesError::OutOfOrder {
                    index,
                    previous: prev_ts,
                    current: timestamp,
                });
            }
            prev = Some((first_symbol, timestamp));
        } else {
            prev = Some((symbol, timestamp));
        }
    }
    Ok(())
}
