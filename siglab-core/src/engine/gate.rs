//! Entry gate — decides whether a bar becomes a trade candidate.
//!
//! Checks run in a fixed order and the first failure wins, so every
//! rejection carries exactly one reason. The gate is read-only: it never
//! mutates cooldown state and never looks past the current bar.

use super::cooldown::CooldownTracker;
use super::ScanConfig;
use crate::domain::SignalBar;
use crate::signals::{evaluate_window, ScoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the gate turned a bar down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    CooldownActive,
    ScoreBelowThreshold,
    ComboNotAllowed,
    TrendMisaligned,
    WeakBody,
    LowVolatility,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CooldownActive => "cooldown_active",
            Self::ScoreBelowThreshold => "score_below_threshold",
            Self::ComboNotAllowed => "combo_not_allowed",
            Self::TrendMisaligned => "trend_misaligned",
            Self::WeakBody => "weak_body",
            Self::LowVolatility => "low_volatility",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An accepted entry, ready for simulation.
///
/// Carries everything the simulator and recorder need so neither has to
/// re-read the entry bar: price and ATR at entry, the multiplier pair the
/// score selected, and the full score snapshot.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub index: usize,
    pub entry_price: f64,
    pub atr_at_entry: f64,
    pub rsi_at_entry: f64,
    pub tp_k: f64,
    pub sl_k: f64,
    pub score: ScoreResult,
}

/// Gate verdict for one bar.
#[derive(Debug, Clone)]
pub enum GateDecision {
    Accept(Box<Candidate>),
    Reject(RejectReason),
}

/// Evaluate the bar at the end of `window` against the entry rules.
///
/// Check order: cooldown, score threshold, combo allow-list, trend
/// alignment, body size, volatility floor.
pub fn evaluate_entry(
    config: &ScanConfig,
    index: usize,
    window: &[SignalBar],
    cooldown: &CooldownTracker,
) -> GateDecision {
    if cooldown.is_blocked(index) {
        return GateDecision::Reject(RejectReason::CooldownActive);
    }

    let score = evaluate_window(window);

    if score.match_score < config.score_threshold {
        return GateDecision::Reject(RejectReason::ScoreBelowThreshold);
    }

    if let Some(allowed) = &config.allowed_combos {
        if !allowed.contains(&score.signal_combo_name) {
            return GateDecision::Reject(RejectReason::ComboNotAllowed);
        }
    }

    // evaluate_window already insisted on a full window.
    let bar = &window[window.len() - 1];

    if bar.ema_9 <= bar.ema_20 {
        return GateDecision::Reject(RejectReason::TrendMisaligned);
    }

    if bar.candle.body() < config.body_fraction * bar.atr {
        return GateDecision::Reject(RejectReason::WeakBody);
    }

    if bar.atr < config.min_atr {
        return GateDecision::Reject(RejectReason::LowVolatility);
    }

    let (tp_k, sl_k) = config.multipliers_for_score(score.match_score);
    GateDecision::Accept(Box::new(Candidate {
        index,
        entry_price: bar.close(),
        atr_at_entry: bar.atr,
        rsi_at_entry: bar.rsi,
        tp_k,
        sl_k,
        score,
    }))
}
