//! Trade simulation — a bounded forward walk with a ratcheting stop.
//!
//! One call simulates one candidate over exactly `max_duration` future bars.
//! Per bar, in order: ratchet the trailing stop from that bar's close and
//! ATR, update excursion extremes, then check target before stop (target
//! wins a same-bar tie). Exits fill at the breached level, never at the bar
//! extreme. Exhausting the horizon takes the explicit timeout transition.

use super::gate::Candidate;
use crate::domain::{ExitReason, SignalBar, TradeType};

/// Lifecycle of a simulated trade. Initial state is `Open`; every `Exited*`
/// state is terminal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TradeState {
    Open,
    ExitedTarget { price: f64, duration: usize },
    ExitedStop { price: f64, duration: usize },
    ExitedTimeout { price: f64, duration: usize },
}

impl TradeState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Open)
    }
}

/// Stop level that only ever tightens.
#[derive(Debug, Clone, Copy)]
pub struct TrailingStop {
    level: f64,
}

impl TrailingStop {
    pub fn new(initial: f64) -> Self {
        Self { level: initial }
    }

    /// Raise the level to `proposed` if higher; never lowers it.
    pub fn ratchet(&mut self, proposed: f64) -> f64 {
        self.level = self.level.max(proposed);
        self.level
    }

    pub fn level(&self) -> f64 {
        self.level
    }
}

/// Everything the forward walk produced for one candidate.
#[derive(Debug, Clone)]
pub struct TradeOutcome {
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    /// Bars held, in `1..=max_duration`.
    pub duration: usize,
    /// Percent return over entry, rounded to 4 decimals.
    pub pnl_pct: f64,
    /// Decided on the raw (unrounded) return.
    pub was_profitable: bool,
    pub trade_type: TradeType,
    pub tp_price: f64,
    /// Initial stop level, before any trailing.
    pub sl_price: f64,
    pub atr_on_exit: f64,
    pub mfe_atr: f64,
    pub mae_atr: f64,
}

/// Walk the candidate through its horizon.
///
/// `horizon` must hold exactly the candidate's future bars
/// (`index + 1 ..= index + max_duration`); the scan loop never offers a
/// candidate with a shorter tail.
pub fn simulate(candidate: &Candidate, horizon: &[SignalBar]) -> TradeOutcome {
    assert!(
        !horizon.is_empty(),
        "simulation horizon must hold at least one bar"
    );

    let entry = candidate.entry_price;
    let atr_entry = candidate.atr_at_entry;
    let tp_price = entry + candidate.tp_k * atr_entry;
    let sl_price = entry - candidate.sl_k * atr_entry;

    let mut trailing = TrailingStop::new(sl_price);
    let mut mfe = f64::NEG_INFINITY;
    let mut mae = f64::INFINITY;
    let mut state = TradeState::Open;

    for (offset, bar) in horizon.iter().enumerate() {
        let j = offset + 1;

        // 1. Ratchet from this bar's close and ATR (entry-time sl_k).
        let stop_level = trailing.ratchet(bar.close() - candidate.sl_k * bar.atr);

        // 2. Excursions in entry-ATR units.
        mfe = mfe.max((bar.high() - entry) / atr_entry);
        mae = mae.min((bar.low() - entry) / atr_entry);

        // 3. Target before stop: a same-bar tie goes to the target.
        if bar.high() >= tp_price {
            state = TradeState::ExitedTarget {
                price: tp_price,
                duration: j,
            };
            break;
        }
        if bar.low() <= stop_level {
            state = TradeState::ExitedStop {
                price: stop_level,
                duration: j,
            };
            break;
        }
    }

    // Explicit default transition when the walk exhausts its bound.
    if state == TradeState::Open {
        state = TradeState::ExitedTimeout {
            price: horizon[horizon.len() - 1].close(),
            duration: horizon.len(),
        };
    }

    let (exit_price, exit_reason, duration) = match state {
        TradeState::ExitedTarget { price, duration } => (price, ExitReason::TpHit, duration),
        TradeState::ExitedStop { price, duration } => (price, ExitReason::SlHit, duration),
        TradeState::ExitedTimeout { price, duration } => (price, ExitReason::Timeout, duration),
        TradeState::Open => unreachable!("walk always reaches a terminal state"),
    };

    let raw_pnl = (exit_price - entry) / entry * 100.0;

    TradeOutcome {
        exit_price,
        exit_reason,
        duration,
        pnl_pct: round4(raw_pnl),
        was_profitable: raw_pnl > 0.0,
        trade_type: TradeType::from_duration(duration),
        tp_price,
        sl_price,
        atr_on_exit: horizon[duration - 1].atr,
        mfe_atr: round4(mfe),
        mae_atr: round4(mae),
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
