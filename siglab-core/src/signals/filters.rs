//! Boolean entry filters evaluated over the trailing window.
//!
//! Each filter answers one question about the current bar relative to its
//! 20-bar context. Rolling comparisons that must not see the current bar
//! shift back by one (the "previous 20"); volume and range width use the
//! trailing 20 including the current bar, matching the rolling definitions.

use crate::domain::SignalBar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rolling context length for the windowed filters.
pub const ROLLING: usize = 20;

/// Fixed record of the named boolean filters plus an extension map.
///
/// Engine logic only ever reads the named fields; the extension map exists so
/// experimental filters can flow through scoring and combo naming without a
/// schema change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterFlags {
    pub recent_high_break: bool,
    pub range_breakout: bool,
    pub strong_candle: bool,
    pub volume_spike: bool,
    pub rsi_bounce: bool,
    pub macd_cross_up: bool,
    pub bb_upper_break: bool,
    pub bb_lower_break: bool,
    pub bb_squeeze_breakout: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, bool>,
}

impl FilterFlags {
    /// Name/value pairs of the fixed filters, in declaration order.
    pub fn named(&self) -> [(&'static str, bool); 9] {
        [
            ("recent_high_break", self.recent_high_break),
            ("range_breakout", self.range_breakout),
            ("strong_candle", self.strong_candle),
            ("volume_spike", self.volume_spike),
            ("rsi_bounce", self.rsi_bounce),
            ("macd_cross_up", self.macd_cross_up),
            ("bb_upper_break", self.bb_upper_break),
            ("bb_lower_break", self.bb_lower_break),
            ("bb_squeeze_breakout", self.bb_squeeze_breakout),
        ]
    }

    /// Looks a filter up by name, fixed fields first, then the extension map.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.named()
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
            .or_else(|| self.extra.get(name).copied())
    }

    /// Names of all triggered filters, sorted.
    pub fn triggered(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .named()
            .iter()
            .filter(|(_, v)| *v)
            .map(|(n, _)| *n)
            .collect();
        names.extend(
            self.extra
                .iter()
                .filter(|(_, v)| **v)
                .map(|(n, _)| n.as_str()),
        );
        names.sort_unstable();
        names
    }

    /// Count of triggered filters.
    pub fn match_score(&self) -> u32 {
        self.triggered().len() as u32
    }

    /// Total number of filters evaluated (fixed plus extensions).
    pub fn filter_count(&self) -> usize {
        9 + self.extra.len()
    }

    /// Canonical combo name: triggered names joined with `+` in sorted
    /// order, or `"none"`. Allow-list matching uses exactly this form.
    pub fn combo_name(&self) -> String {
        let names = self.triggered();
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join("+")
        }
    }
}

/// Evaluate every filter over a trailing window whose last bar is current.
///
/// The window must hold at least `ROLLING + 1` warm bars.
pub fn evaluate_filters(window: &[SignalBar]) -> FilterFlags {
    assert!(
        window.len() > ROLLING,
        "filter window needs more than {ROLLING} bars, got {}",
        window.len()
    );
    let n = window.len();
    let cur = &window[n - 1];
    let prev = &window[n - 2];
    // 20 bars ending at the previous bar (rolling max, shifted by one).
    let shifted = &window[n - 1 - ROLLING..n - 1];
    // 20 bars ending at the current bar.
    let trailing = &window[n - ROLLING..n];

    let shifted_close_max = max_of(shifted.iter().map(|b| b.close()));
    let shifted_high_max = max_of(shifted.iter().map(|b| b.high()));
    let trailing_high_max = max_of(trailing.iter().map(|b| b.high()));
    let trailing_low_min = min_of(trailing.iter().map(|b| b.low()));
    let trailing_vol_mean =
        trailing.iter().map(|b| b.volume()).sum::<f64>() / ROLLING as f64;

    let range_size = trailing_high_max - trailing_low_min;

    FilterFlags {
        recent_high_break: cur.close() > shifted_close_max,
        range_breakout: cur.close() > shifted_high_max && range_size > cur.atr,
        strong_candle: cur.candle.body() > 0.7 * cur.atr,
        volume_spike: cur.volume() > 1.2 * trailing_vol_mean,
        rsi_bounce: (45.0..=52.0).contains(&cur.rsi),
        macd_cross_up: cur.macd > cur.macd_signal,
        bb_upper_break: cur.close() > cur.bb_upper,
        bb_lower_break: cur.close() < cur.bb_lower,
        bb_squeeze_breakout: (prev.bb_upper - prev.bb_lower) < cur.atr
            && cur.close() > prev.bb_upper,
        extra: BTreeMap::new(),
    }
}

fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}

fn min_of(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::INFINITY, f64::min)
}
