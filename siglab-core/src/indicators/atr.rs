//! Average True Range (ATR).
//!
//! TR[t] = max(high - low, |high - prev_close|, |low - prev_close|)
//! TR[0] = high - low (no previous close to gap against).
//! ATR = SMA(period) of TR — the plain rolling-mean variant, not Wilder.
//! Lookback: period - 1.

use super::Indicator;
use crate::domain::Candle;

/// True range of a single candle given the previous close.
pub fn true_range(candle: &Candle, prev_close: Option<f64>) -> f64 {
    let hl = candle.high - candle.low;
    match prev_close {
        Some(pc) => {
            let hc = (candle.high - pc).abs();
            let lc = (candle.low - pc).abs();
            hl.max(hc).max(lc)
        }
        None => hl,
    }
}

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let n = candles.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        let tr: Vec<f64> = candles
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let prev_close = if i == 0 {
                    None
                } else {
                    Some(candles[i - 1].close)
                };
                true_range(c, prev_close)
            })
            .collect();

        for i in (self.period - 1)..n {
            let window = &tr[i + 1 - self.period..=i];
            if window.iter().any(|v| v.is_nan()) {
                continue; // window straddles a NaN range, leave NaN
            }
            result[i] = window.iter().sum::<f64>() / self.period as f64;
        }

        result
    }
}
