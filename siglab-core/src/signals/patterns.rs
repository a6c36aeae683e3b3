//! Candlestick pattern annotation.
//!
//! Patterns are informational: they ride along on the score result and the
//! trade snapshot but never gate an entry.

use crate::domain::Candle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Single-bar / two-bar pattern classification.
///
/// Detection precedence is hammer, then doji, then bullish engulfing; the
/// first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandlePattern {
    Hammer,
    Doji,
    EngulfingBull,
    None,
}

impl CandlePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hammer => "hammer",
            Self::Doji => "doji",
            Self::EngulfingBull => "engulfing_bull",
            Self::None => "none",
        }
    }
}

impl fmt::Display for CandlePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the current candle against its predecessor.
pub fn detect_pattern(current: &Candle, previous: &Candle) -> CandlePattern {
    let body = current.body();

    let is_hammer =
        current.lower_wick() > 2.0 * body && current.upper_wick() < 0.2 * body;
    if is_hammer {
        return CandlePattern::Hammer;
    }

    if body < 0.1 * current.range() {
        return CandlePattern::Doji;
    }

    let is_engulfing_bull = previous.is_bearish()
        && current.is_bullish()
        && current.close > previous.open
        && current.open < previous.close;
    if is_engulfing_bull {
        return CandlePattern::EngulfingBull;
    }

    CandlePattern::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            symbol: "TEST".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn detects_hammer() {
        // Body 1.0, lower wick 5.0, upper wick 0.1.
        let cur = candle(100.0, 101.1, 95.0, 101.0);
        let prev = candle(100.0, 101.0, 99.0, 100.5);
        assert_eq!(detect_pattern(&cur, &prev), CandlePattern::Hammer);
    }

    #[test]
    fn detects_doji() {
        // Body 0.05 against a 2.0 range.
        let cur = candle(100.0, 101.0, 99.0, 100.05);
        let prev = candle(100.0, 101.0, 99.0, 100.5);
        assert_eq!(detect_pattern(&cur, &prev), CandlePattern::Doji);
    }

    #[test]
    fn detects_engulfing_bull() {
        // Previous closed down 101 -> 100; current opens below that close
        // and closes above the previous open.
        let prev = candle(101.0, 101.5, 99.5, 100.0);
        let cur = candle(99.8, 102.5, 99.5, 102.0);
        assert_eq!(detect_pattern(&cur, &prev), CandlePattern::EngulfingBull);
    }

    #[test]
    fn hammer_beats_doji() {
        // Tiny body with a long lower wick and no upper wick satisfies both
        // hammer and doji; hammer wins on precedence.
        let cur = candle(100.0, 100.01, 95.0, 100.01);
        let prev = candle(100.0, 101.0, 99.0, 100.5);
        assert_eq!(detect_pattern(&cur, &prev), CandlePattern::Hammer);
    }

    #[test]
    fn plain_candle_is_none() {
        let prev = candle(99.0, 101.0, 98.5, 100.5);
        let cur = candle(100.5, 102.0, 100.0, 101.5);
        assert_eq!(detect_pattern(&cur, &prev), CandlePattern::None);
    }

    #[test]
    fn pattern_wire_strings() {
        assert_eq!(
            serde_json::to_string(&CandlePattern::EngulfingBull).unwrap(),
            "\"engulfing_bull\""
        );
        assert_eq!(CandlePattern::None.to_string(), "none");
    }
}
