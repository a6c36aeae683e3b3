//! Concrete indicator implementations.
//!
//! All five indicator families implement the `Indicator` trait below. They are
//! precomputed once over the raw candle series before any scanning; the
//! enrichment pipeline stitches their output columns onto `SignalBar`s.
//!
//! Multi-series indicators (MACD, Bollinger) are exposed as separate named
//! instances per output line, keeping the single-series trait unchanged.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;

pub use atr::Atr;
pub use bollinger::{Bollinger, BollingerBand};
pub use ema::Ema;
pub use macd::{macd_lines, Macd, MacdLine};
pub use rsi::Rsi;

use crate::domain::Candle;

/// Trait for indicators.
///
/// Indicators take a full candle series and produce a numeric output series of
/// the same length. The first `lookback()` values are `f64::NAN` (warm-up).
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_9", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire candle series.
    ///
    /// Returns a `Vec<f64>` of the same length as `candles`.
    /// The first `lookback()` values are `f64::NAN`.
    fn compute(&self, candles: &[Candle]) -> Vec<f64>;
}

/// Create synthetic candles from close prices for testing.
///
/// Generates plausible OHLCV: open = prev_close (or close for first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    use chrono::{Duration, TimeZone, Utc};
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Candle {
                symbol: "TEST".to_string(),
                timestamp: base + Duration::minutes(i as i64),
                open,
                high,
                low,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
