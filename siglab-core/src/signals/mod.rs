//! Signal evaluation — scores each bar against its trailing window.
//!
//! The evaluator is a pure function: a trailing window of warm bars in, a
//! `ScoreResult` out. It never sees trade or cooldown state, so the same
//! window always produces the same score.

pub mod filters;
pub mod patterns;

pub use filters::{evaluate_filters, FilterFlags, ROLLING};
pub use patterns::{detect_pattern, CandlePattern};

use crate::domain::SignalBar;
use serde::{Deserialize, Serialize};

/// Trailing window length the evaluator consumes: the 20-bar rolling context
/// plus the shifted comparison bar.
pub const WINDOW: usize = ROLLING + 1;

/// Score at which the evaluator itself calls the bar a signal. The entry
/// gate applies its own configured threshold; this one only feeds the
/// `final_signal` annotation.
const FINAL_SIGNAL_MIN_SCORE: u32 = 4;

/// Outcome of evaluating one bar against its trailing window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub match_score: u32,
    pub final_signal: bool,
    pub filters: FilterFlags,
    /// Canonical combo: triggered filter names joined with `+`, sorted,
    /// or `"none"`.
    pub signal_combo_name: String,
    pub debug_note: String,
    pub detected_pattern: CandlePattern,
}

/// Evaluate the bar at the end of `window`.
///
/// `window` must hold at least [`WINDOW`] bars; the last bar is the one
/// being scored.
pub fn evaluate_window(window: &[SignalBar]) -> ScoreResult {
    let flags = evaluate_filters(window);
    let match_score = flags.match_score();
    let final_signal = match_score >= FINAL_SIGNAL_MIN_SCORE;
    let debug_note = format!("{match_score}/{} filters matched", flags.filter_count());
    let signal_combo_name = flags.combo_name();
    let n = window.len();
    let detected_pattern = detect_pattern(&window[n - 1].candle, &window[n - 2].candle);

    ScoreResult {
        match_score,
        final_signal,
        filters: flags,
        signal_combo_name,
        debug_note,
        detected_pattern,
    }
}

/// Shared fixture: a warm, signal-free trailing window tests mutate into
/// whatever shape they need.
#[cfg(test)]
pub mod test_window {
    use crate::domain::{Candle, SignalBar};
    use chrono::{Duration, TimeZone, Utc};

    pub const WINDOW_LEN: usize = super::WINDOW;

    /// One warm bar engineered so that no filter triggers: flat close at
    /// 100.0, calm volume, RSI parked at 60, MACD flat, wide bands. Bars
    /// are spaced a minute apart by index.
    pub fn neutral_bar(i: usize) -> SignalBar {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        SignalBar {
            candle: Candle {
                symbol: "TEST".into(),
                timestamp: base + Duration::minutes(i as i64),
                open: 100.0,
                high: 100.5,
                low: 99.5,
                close: 100.0,
                volume: 1_000.0,
            },
            atr: 2.0,
            rsi: 60.0,
            macd: 0.0,
            macd_signal: 0.0,
            macd_histogram: 0.0,
            ema_9: 101.0,
            ema_20: 100.0,
            bb_upper: 103.0,
            bb_middle: 100.0,
            bb_lower: 97.0,
        }
    }

    /// `len` signal-free bars on a one-minute cadence.
    pub fn neutral_series(len: usize) -> Vec<SignalBar> {
        (0..len).map(neutral_bar).collect()
    }

    /// A full evaluation window of signal-free bars.
    pub fn neutral_window() -> Vec<SignalBar> {
        neutral_series(WINDOW_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::test_window::neutral_window;
    use super::*;

    #[test]
    fn neutral_window_scores_zero() {
        let result = evaluate_window(&neutral_window());
        assert_eq!(result.match_score, 0);
        assert!(!result.final_signal);
        assert_eq!(result.signal_combo_name, "none");
        assert_eq!(result.debug_note, "0/9 filters matched");
    }

    #[test]
    fn score_counts_triggered_filters() {
        let mut window = neutral_window();
        {
            let last = window.last_mut().unwrap();
            last.rsi = 48.0; // rsi_bounce
            last.macd = 0.5; // macd_cross_up
            last.candle.open = 99.6;
            last.candle.close = 101.2; // strong_candle + recent_high_break
            last.candle.high = 101.3;
            last.candle.low = 99.5;
        }
        let result = evaluate_window(&window);
        assert!(result.filters.rsi_bounce);
        assert!(result.filters.macd_cross_up);
        assert!(result.filters.strong_candle);
        assert!(result.filters.recent_high_break);
        assert_eq!(result.match_score, 4);
        assert!(result.final_signal);
        assert_eq!(
            result.signal_combo_name,
            "macd_cross_up+recent_high_break+rsi_bounce+strong_candle"
        );
        assert_eq!(result.debug_note, "4/9 filters matched");
    }

    #[test]
    fn final_signal_needs_four_filters() {
        let mut window = neutral_window();
        {
            let last = window.last_mut().unwrap();
            last.rsi = 48.0;
            last.macd = 0.5;
        }
        let result = evaluate_window(&window);
        assert_eq!(result.match_score, 2);
        assert!(!result.final_signal);
    }

    #[test]
    fn pattern_annotation_rides_along() {
        let mut window = neutral_window();
        let n = window.len();
        {
            // Previous bar closes down, current engulfs it.
            let prev = &mut window[n - 2];
            prev.candle.open = 101.0;
            prev.candle.close = 100.0;
            prev.candle.high = 101.5;
            prev.candle.low = 99.5;
        }
        {
            let cur = &mut window[n - 1];
            cur.candle.open = 99.8;
            cur.candle.close = 101.5;
            cur.candle.high = 102.5;
            cur.candle.low = 99.5;
        }
        let result = evaluate_window(&window);
        assert_eq!(result.detected_pattern, CandlePattern::EngulfingBull);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let window = neutral_window();
        let a = serde_json::to_string(&evaluate_window(&window)).unwrap();
        let b = serde_json::to_string(&evaluate_window(&window)).unwrap();
        assert_eq!(a, b);
    }
}
