//! Enrichment pipeline — raw candles to signal-ready bars.
//!
//! Attaches the full indicator column set to each candle. Indicator values
//! stay NaN until their lookback is satisfied; the longest lookback in the
//! standard set is Bollinger's, warm from index 19. The scan loop counts
//! windows still overlapping that prefix as warm-up skips. Candle sanity
//! problems are reported as warnings, never dropped: the scan loop's
//! malformed-bar handling decides what to do with bad data.

use crate::domain::{Candle, SignalBar};
use crate::indicators::{macd_lines, Atr, Bollinger, Ema, Indicator, Rsi};

// Standard indicator parameter set.
pub const EMA_FAST_SPAN: usize = 9;
pub const EMA_SLOW_SPAN: usize = 20;
pub const RSI_PERIOD: usize = 14;
pub const ATR_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_MULTIPLIER: f64 = 2.0;

/// Output of the enrichment pass.
#[derive(Debug, Clone)]
pub struct EnrichedSeries {
    pub bars: Vec<SignalBar>,
    pub warnings: Vec<String>,
}

/// Attach the standard indicator columns to a raw candle series.
pub fn enrich_candles(candles: &[Candle]) -> EnrichedSeries {
    let mut warnings = Vec::new();
    for (i, candle) in candles.iter().enumerate() {
        if candle.is_void() {
            warnings.push(format!(
                "bar {i} ({}): non-finite candle field",
                candle.timestamp
            ));
        } else if !candle.is_sane() {
            warnings.push(format!(
                "bar {i} ({}): inconsistent candle geometry",
                candle.timestamp
            ));
        }
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let ema_9 = Ema::new(EMA_FAST_SPAN).compute(candles);
    let ema_20 = Ema::new(EMA_SLOW_SPAN).compute(candles);
    let rsi = Rsi::new(RSI_PERIOD).compute(candles);
    let atr = Atr::new(ATR_PERIOD).compute(candles);
    let bb_upper = Bollinger::upper(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER).compute(candles);
    let bb_middle = Bollinger::middle(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER).compute(candles);
    let bb_lower = Bollinger::lower(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER).compute(candles);
    let (macd, macd_signal, macd_histogram) =
        macd_lines(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);

    let bars = candles
        .iter()
        .enumerate()
        .map(|(i, candle)| SignalBar {
            candle: candle.clone(),
            atr: atr[i],
            rsi: rsi[i],
            macd: macd[i],
            macd_signal: macd_signal[i],
            macd_histogram: macd_histogram[i],
            ema_9: ema_9[i],
            ema_20: ema_20[i],
            bb_upper: bb_upper[i],
            bb_middle: bb_middle[i],
            bb_lower: bb_lower[i],
        })
        .collect();

    EnrichedSeries { bars, warnings }
}
