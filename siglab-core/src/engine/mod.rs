//! Scan engine — entry gating, trade simulation, cooldown, recording.
//!
//! The engine is deliberately dumb about data acquisition and indicator
//! math: it consumes an enriched `SignalBar` series and a `ScanConfig`, and
//! produces trades plus skip diagnostics. Everything in here is
//! deterministic and wall-clock free.

pub mod cooldown;
pub mod gate;
pub mod recorder;
pub mod scan;
pub mod simulator;

pub use cooldown::CooldownTracker;
pub use gate::{evaluate_entry, Candidate, GateDecision, RejectReason};
pub use recorder::TradeRecorder;
pub use scan::{scan_series, GateRejections, ScanError, ScanOutcome, SkipCounts};
pub use simulator::{simulate, TradeOutcome, TradeState, TrailingStop};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Tunable parameters for one scan.
///
/// Defaults mirror the tuned combo-scalp strategy; construct with struct
/// update syntax to vary single knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Minimum match score for a candidate to pass the gate.
    pub score_threshold: u32,
    /// Target multiplier applied to entry ATR (base strength tier).
    pub tp_k_base: f64,
    /// Stop multiplier applied to entry ATR (base strength tier).
    pub sl_k_base: f64,
    /// Simulation horizon in bars.
    pub max_duration: usize,
    /// Bars blocked after a losing exit.
    pub cooldown_duration: usize,
    /// Canonical combo names allowed to trade; `None` = no restriction.
    pub allowed_combos: Option<BTreeSet<String>>,
    /// Minimum candle body as a fraction of ATR.
    pub body_fraction: f64,
    /// Minimum ATR for an entry (volatility floor).
    pub min_atr: f64,
    /// Score at which the strong multiplier pair applies.
    pub strong_score_threshold: u32,
    pub tp_k_strong: f64,
    pub sl_k_strong: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let mut combos = BTreeSet::new();
        combos.insert("rsi_bounce+strong_candle".to_string());
        Self {
            score_threshold: 2,
            tp_k_base: 1.95,
            sl_k_base: 1.5,
            max_duration: 3,
            cooldown_duration: 3,
            allowed_combos: Some(combos),
            body_fraction: 0.1,
            min_atr: 0.2,
            strong_score_threshold: 5,
            tp_k_strong: 2.2,
            sl_k_strong: 1.2,
        }
    }
}

impl ScanConfig {
    /// Rejects parameter combinations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ScanConfigError> {
        if self.max_duration == 0 {
            return Err(ScanConfigError::ZeroDuration);
        }
        for (name, value) in [
            ("tp_k_base", self.tp_k_base),
            ("sl_k_base", self.sl_k_base),
            ("tp_k_strong", self.tp_k_strong),
            ("sl_k_strong", self.sl_k_strong),
        ] {
            if !(value > 0.0) {
                return Err(ScanConfigError::NonPositiveMultiplier { name, value });
            }
        }
        if !(self.body_fraction >= 0.0) {
            return Err(ScanConfigError::NegativeBodyFraction {
                value: self.body_fraction,
            });
        }
        Ok(())
    }

    /// Multiplier pair for a given match score.
    pub fn multipliers_for_score(&self, match_score: u32) -> (f64, f64) {
        if match_score >= self.strong_score_threshold {
            (self.tp_k_strong, self.sl_k_strong)
        } else {
            (self.tp_k_base, self.sl_k_base)
        }
    }
}

/// Parameter errors caught before a scan starts.
#[derive(Debug, Error)]
pub enum ScanConfigError {
    #[error("max_duration must be >= 1")]
    ZeroDuration,
    #[error("{name} must be > 0, got {value}")]
    NonPositiveMultiplier { name: &'static str, value: f64 },
    #[error("body_fraction must be >= 0, got {value}")]
    NegativeBodyFraction { value: f64 },
}
