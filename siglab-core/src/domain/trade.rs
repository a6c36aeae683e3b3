//! TradeRecord — a completed simulated trade with its full signal snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a simulated trade left the market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Target level breached.
    TpHit,
    /// Trailing stop level breached.
    SlHit,
    /// Horizon exhausted without a breach.
    Timeout,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TpHit => "tp_hit",
            Self::SlHit => "sl_hit",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holding-time classification, by bar count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeType {
    Scalp,
    Swing,
    Position,
}

impl TradeType {
    const SCALP_MAX: usize = 3;
    const SWING_MAX: usize = 15;

    /// Classifies a duration in bars: <= 3 Scalp, <= 15 Swing, else Position.
    pub fn from_duration(duration_candles: usize) -> Self {
        if duration_candles <= Self::SCALP_MAX {
            Self::Scalp
        } else if duration_candles <= Self::SWING_MAX {
            Self::Swing
        } else {
            Self::Position
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scalp => "Scalp",
            Self::Swing => "Swing",
            Self::Position => "Position",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed simulated trade.
///
/// Field order doubles as the serialization column contract: every exporter
/// (CSV, JSON) emits columns in exactly this order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    // ── Identification ──
    /// Entry bar timestamp.
    pub timestamp: DateTime<Utc>,
    pub symbol: String,

    // ── Entry / exit ──
    pub entry_price: f64,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub duration_candles: usize,

    // ── Outcome ──
    /// Percent return over entry, rounded to 4 decimals.
    pub pnl_pct: f64,
    pub was_profitable: bool,
    pub trade_type: TradeType,

    // ── Levels ──
    pub tp_price: f64,
    /// Initial stop level (before any trailing).
    pub sl_price: f64,
    pub atr_on_exit: f64,

    // ── Excursion (in entry-ATR units, rounded to 4 decimals) ──
    pub mfe_atr: f64,
    pub mae_atr: f64,

    // ── Signal snapshot ──
    pub match_score: u32,
    pub rsi_bounce: bool,
    pub macd_cross_up: bool,
    pub recent_high_break: bool,
    pub range_breakout: bool,
    pub strong_candle: bool,
    pub volume_spike: bool,
    pub signal_combo_name: String,
    pub logic_debug_note: String,
}

impl TradeRecord {
    pub fn is_winner(&self) -> bool {
        self.was_profitable
    }
}
