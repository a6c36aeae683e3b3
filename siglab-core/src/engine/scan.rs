//! Series scan — drives gate, simulator, cooldown, and recorder over a
//! full bar series.
//!
//! The loop visits every index once, in order. Warm-up and horizon
//! shortfalls are counted, malformed data is counted and warned about, gate
//! rejections are tallied per reason, and accepted candidates are simulated
//! and recorded. Nothing in here is fatal once validation passes: bad data
//! shrinks the output, it never truncates a record. Every index lands in
//! exactly one bucket, so the counters plus the trade count always sum to
//! the series length.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cooldown::CooldownTracker;
use super::gate::{evaluate_entry, GateDecision, RejectReason};
use super::recorder::TradeRecorder;
use super::simulator::simulate;
use super::{ScanConfig, ScanConfigError};
use crate::domain::{validate_bars, SeriesError, SignalBar, TradeRecord};
use crate::signals::WINDOW;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Series(#[from] SeriesError),
    #[error(transparent)]
    Config(#[from] ScanConfigError),
}

/// Indices the scan could not evaluate, by cause. These are data-shape
/// problems; strategy rejections live in [`GateRejections`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    /// Index below the evaluation window length, or window still reaching
    /// into the indicator warm-up prefix.
    pub insufficient_warmup: usize,
    /// Fewer than `max_duration` bars remain after the index.
    pub insufficient_horizon: usize,
    /// NaN or non-finite data inside the window or the horizon.
    pub malformed_bar: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.insufficient_warmup + self.insufficient_horizon + self.malformed_bar
    }
}

/// Per-reason tally of gate rejections on cleanly evaluated bars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateRejections {
    pub cooldown_active: usize,
    pub score_below_threshold: usize,
    pub combo_not_allowed: usize,
    pub trend_misaligned: usize,
    pub weak_body: usize,
    pub low_volatility: usize,
}

impl GateRejections {
    fn bump(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::CooldownActive => self.cooldown_active += 1,
            RejectReason::ScoreBelowThreshold => self.score_below_threshold += 1,
            RejectReason::ComboNotAllowed => self.combo_not_allowed += 1,
            RejectReason::TrendMisaligned => self.trend_misaligned += 1,
            RejectReason::WeakBody => self.weak_body += 1,
            RejectReason::LowVolatility => self.low_volatility += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.cooldown_active
            + self.score_below_threshold
            + self.combo_not_allowed
            + self.trend_misaligned
            + self.weak_body
            + self.low_volatility
    }
}

/// Everything one scan produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub trades: Vec<TradeRecord>,
    pub skipped: SkipCounts,
    pub gate_rejections: GateRejections,
    pub warnings: Vec<String>,
}

/// Scan an enriched bar series for entries and simulate each accepted
/// candidate.
///
/// The series must be a single symbol in strictly increasing timestamp
/// order. The loop advances one index at a time after a completed
/// simulation, so trade lifetimes may overlap; the cooldown tracker is the
/// only cross-trade coupling.
pub fn scan_series(config: &ScanConfig, bars: &[SignalBar]) -> Result<ScanOutcome, ScanError> {
    config.validate()?;
    validate_bars(bars)?;

    let mut cooldown = CooldownTracker::new(config.cooldown_duration);
    let mut recorder = TradeRecorder::new();
    let mut skipped = SkipCounts::default();
    let mut gate_rejections = GateRejections::default();
    let mut warnings = Vec::new();

    // First fully warm bar. Windows reaching back before it are still in
    // indicator warm-up; NaN past it is a data defect.
    let warm_start = bars
        .iter()
        .position(SignalBar::is_warm)
        .unwrap_or(bars.len());

    for i in 0..bars.len() {
        if i < WINDOW {
            skipped.insufficient_warmup += 1;
            continue;
        }
        if i + config.max_duration >= bars.len() {
            skipped.insufficient_horizon += 1;
            continue;
        }
        if i + 1 - WINDOW < warm_start {
            skipped.insufficient_warmup += 1;
            continue;
        }

        let window = &bars[i + 1 - WINDOW..=i];
        if window.iter().any(|bar| bar.is_malformed()) {
            skipped.malformed_bar += 1;
            warnings.push(format!("bar {i}: malformed data in evaluation window"));
            continue;
        }

        let candidate = match evaluate_entry(config, i, window, &cooldown) {
            GateDecision::Reject(reason) => {
                gate_rejections.bump(reason);
                continue;
            }
            GateDecision::Accept(candidate) => candidate,
        };

        let horizon = &bars[i + 1..=i + config.max_duration];
        if horizon
            .iter()
            .any(|bar| bar.candle.is_void() || !bar.atr.is_finite())
        {
            skipped.malformed_bar += 1;
            warnings.push(format!("bar {i}: malformed data in simulation horizon"));
            continue;
        }

        let outcome = simulate(&candidate, horizon);
        cooldown.on_trade_closed(candidate.index, outcome.duration, outcome.was_profitable);
        recorder.record(&bars[i], &candidate, &outcome);
    }

    Ok(ScanOutcome {
        trades: recorder.into_trades(),
        skipped,
        gate_rejections,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExitReason;
    use crate::signals::test_window::neutral_series;

    fn config() -> ScanConfig {
        ScanConfig::default()
    }

    /// Turns a neutral bar into an accepted entry: rsi_bounce plus
    /// strong_candle, nothing else, score 2.
    fn make_signal(bar: &mut SignalBar) {
        bar.rsi = 48.0;
        bar.candle.open = 98.2;
        bar.candle.close = 99.9;
        bar.candle.high = 100.1;
        bar.candle.low = 98.0;
    }

    /// Forces a stop exit on the first horizon bar of a fresh entry: the
    /// low dives through the 96.9 initial stop without reaching the target.
    fn make_stop_runner(bar: &mut SignalBar) {
        bar.candle.open = 99.5;
        bar.candle.close = 99.0;
        bar.candle.high = 100.0;
        bar.candle.low = 96.5;
    }

    fn bucket_sum(outcome: &ScanOutcome) -> usize {
        outcome.skipped.total() + outcome.gate_rejections.total() + outcome.trades.len()
    }

    #[test]
    fn empty_series_scans_to_nothing() {
        let outcome = scan_series(&config(), &[]).unwrap();
        assert!(outcome.trades.is_empty());
        assert_eq!(outcome.skipped.total(), 0);
        assert_eq!(outcome.gate_rejections.total(), 0);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn short_series_is_all_warmup() {
        let bars = neutral_series(10);
        let outcome = scan_series(&config(), &bars).unwrap();
        assert!(outcome.trades.is_empty());
        assert_eq!(outcome.skipped.insufficient_warmup, 10);
        assert_eq!(bucket_sum(&outcome), bars.len());
    }

    #[test]
    fn signal_bar_produces_one_trade() {
        let mut bars = neutral_series(30);
        make_signal(&mut bars[21]);

        let outcome = scan_series(&config(), &bars).unwrap();

        assert_eq!(outcome.trades.len(), 1);
        let trade = &outcome.trades[0];
        assert_eq!(trade.entry_price, 99.9);
        assert_eq!(trade.signal_combo_name, "rsi_bounce+strong_candle");
        assert_eq!(trade.match_score, 2);
        // Neutral horizon bars never reach 103.8 or fall to the stop.
        assert_eq!(trade.exit_reason, ExitReason::Timeout);
        assert_eq!(trade.duration_candles, 3);
        assert_eq!(trade.exit_price, 100.0);
        assert!(trade.was_profitable);

        assert_eq!(outcome.skipped.insufficient_warmup, 21);
        assert_eq!(outcome.skipped.insufficient_horizon, 3);
        assert_eq!(outcome.skipped.malformed_bar, 0);
        assert_eq!(outcome.gate_rejections.score_below_threshold, 5);
        assert_eq!(bucket_sum(&outcome), bars.len());
    }

    #[test]
    fn loss_arms_cooldown_until_it_expires() {
        let mut bars = neutral_series(31);
        make_signal(&mut bars[21]);
        make_stop_runner(&mut bars[22]); // first trade exits sl_hit, duration 1
        make_signal(&mut bars[24]); // inside cooldown: exit 22, blocked through 25
        make_signal(&mut bars[27]); // free again

        let outcome = scan_series(&config(), &bars).unwrap();

        assert_eq!(outcome.trades.len(), 2);
        let first = &outcome.trades[0];
        assert_eq!(first.exit_reason, ExitReason::SlHit);
        assert_eq!(first.exit_price, 96.9);
        assert_eq!(first.duration_candles, 1);
        assert!(!first.was_profitable);

        let second = &outcome.trades[1];
        assert_eq!(second.exit_reason, ExitReason::Timeout);
        assert!(second.was_profitable);

        assert_eq!(outcome.gate_rejections.cooldown_active, 1);
        assert_eq!(outcome.gate_rejections.score_below_threshold, 4);
        assert_eq!(bucket_sum(&outcome), bars.len());
    }

    #[test]
    fn unwarmed_prefix_counts_as_warmup_not_malformed() {
        let mut bars = neutral_series(50);
        // Mimic indicator warm-up: sentinel values through bar 18.
        for bar in &mut bars[..19] {
            bar.rsi = f64::NAN;
            bar.bb_upper = f64::NAN;
        }
        make_signal(&mut bars[40]);

        let outcome = scan_series(&config(), &bars).unwrap();

        // Windows clear the prefix once they start at bar 19: index 39 on.
        assert_eq!(outcome.skipped.insufficient_warmup, 39);
        assert_eq!(outcome.skipped.malformed_bar, 0);
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.gate_rejections.score_below_threshold, 7);
        assert_eq!(bucket_sum(&outcome), bars.len());
    }

    #[test]
    fn malformed_window_bar_is_counted_and_warned() {
        let mut bars = neutral_series(30);
        make_signal(&mut bars[21]);
        bars[10].rsi = f64::NAN;

        let outcome = scan_series(&config(), &bars).unwrap();

        // Bar 10 sits in every evaluation window of this short series.
        assert!(outcome.trades.is_empty());
        assert_eq!(outcome.skipped.malformed_bar, 6);
        assert_eq!(outcome.warnings.len(), 6);
        assert!(outcome.warnings[0].contains("evaluation window"));
        assert_eq!(outcome.gate_rejections.total(), 0);
        assert_eq!(bucket_sum(&outcome), bars.len());
    }

    #[test]
    fn malformed_horizon_rejects_an_accepted_candidate() {
        let mut bars = neutral_series(30);
        make_signal(&mut bars[21]);
        bars[23].atr = f64::NAN;

        let outcome = scan_series(&config(), &bars).unwrap();

        assert!(outcome.trades.is_empty());
        // One horizon rejection at 21, four window skips at 23..=26.
        assert_eq!(outcome.skipped.malformed_bar, 5);
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.contains("simulation horizon")));
        assert_eq!(outcome.gate_rejections.score_below_threshold, 1);
        assert_eq!(bucket_sum(&outcome), bars.len());
    }

    #[test]
    fn scans_are_deterministic() {
        let mut bars = neutral_series(40);
        make_signal(&mut bars[21]);
        make_stop_runner(&mut bars[22]);
        make_signal(&mut bars[27]);

        let a = scan_series(&config(), &bars).unwrap();
        let b = scan_series(&config(), &bars).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn unsorted_series_is_rejected() {
        let mut bars = neutral_series(5);
        bars[3].candle.timestamp = bars[1].candle.timestamp;
        let err = scan_series(&config(), &bars).unwrap_err();
        assert!(matches!(err, ScanError::Series(_)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = config();
        cfg.max_duration = 0;
        let err = scan_series(&cfg, &neutral_series(30)).unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));
    }
}
