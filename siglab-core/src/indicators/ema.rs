//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1]
//! Seed: EMA[0] = close[0] — the recursion runs from the very first bar, so
//! the series carries no warm-up NaN prefix (lookback 0). Early values lean
//! on the seed and converge to the steady-state EMA within a few spans.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            name: format!("ema_{span}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        ema_of_series(&closes, self.span)
    }
}

/// Compute raw EMA values from a pre-extracted f64 slice.
/// Used internally by composed indicators (MACD) that need EMA of an
/// arbitrary series.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n == 0 || span == 0 {
        return result;
    }

    let alpha = 2.0 / (span as f64 + 1.0);

    if values[0].is_nan() {
        return result; // NaN seed taints the whole recursion
    }
    result[0] = values[0];

    let mut prev = values[0];
    for i in 1..n {
        if values[i].is_nan() {
            // NaN propagates: once we see NaN, subsequent values are tainted
            for val in result.iter_mut().skip(i) {
                *val = f64::NAN;
            }
            return result;
        }
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = ema;
        prev = ema;
    }

    result
}
