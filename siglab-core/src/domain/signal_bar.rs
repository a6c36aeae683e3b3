//! SignalBar — a candle enriched with the indicator columns the engine reads.

use super::candle::Candle;
use serde::{Deserialize, Serialize};

/// Candle plus precomputed indicator values.
///
/// Indicator fields are `NaN` until their warm-up length has accumulated.
/// The scan engine refuses to evaluate any window that still contains
/// unwarmed bars, so downstream logic never sees a sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalBar {
    #[serde(flatten)]
    pub candle: Candle,
    pub atr: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub ema_9: f64,
    pub ema_20: f64,
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
}

impl SignalBar {
    /// True once every indicator field is finite.
    pub fn is_warm(&self) -> bool {
        self.atr.is_finite()
            && self.rsi.is_finite()
            && self.macd.is_finite()
            && self.macd_signal.is_finite()
            && self.macd_histogram.is_finite()
            && self.ema_9.is_finite()
            && self.ema_20.is_finite()
            && self.bb_upper.is_finite()
            && self.bb_middle.is_finite()
            && self.bb_lower.is_finite()
    }

    /// True when any OHLCV or indicator field is non-finite.
    ///
    /// Past the warm-up length this is a data defect, not a warm-up state.
    pub fn is_malformed(&self) -> bool {
        self.candle.is_void() || !self.is_warm()
    }

    pub fn open(&self) -> f64 {
        self.candle.open
    }

    pub fn high(&self) -> f64 {
        self.candle.high
    }

    pub fn low(&self) -> f64 {
        self.candle.low
    }

    pub fn close(&self) -> f64 {
        self.candle.close
    }

    pub fn volume(&self) -> f64 {
        self.candle.volume
    }
}
