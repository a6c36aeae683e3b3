//! Summary statistics — pure functions over a scan's trade list.
//!
//! Every statistic is a pure function: trade list in, value out. No
//! dependencies on the runner, the data pipeline, or the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use siglab_core::domain::TradeRecord;

/// Aggregate statistics for one scan run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub trade_count: usize,
    pub win_rate: f64,
    pub avg_pnl_pct: f64,
    pub median_pnl_pct: f64,
    pub profit_factor: f64,
    pub expectancy: f64,
    pub avg_mfe_atr: f64,
    pub avg_mae_atr: f64,
    pub max_consecutive_losses: usize,
    pub by_exit_reason: BTreeMap<String, usize>,
    pub by_trade_type: BTreeMap<String, usize>,
    pub by_combo: BTreeMap<String, usize>,
}

impl ScanSummary {
    /// Compute all statistics from a trade list.
    pub fn compute(trades: &[TradeRecord]) -> Self {
        Self {
            trade_count: trades.len(),
            win_rate: win_rate(trades),
            avg_pnl_pct: avg_pnl_pct(trades),
            median_pnl_pct: median_pnl_pct(trades),
            profit_factor: profit_factor(trades),
            expectancy: expectancy(trades),
            avg_mfe_atr: avg_mfe_atr(trades),
            avg_mae_atr: avg_mae_atr(trades),
            max_consecutive_losses: max_consecutive_losses(trades),
            by_exit_reason: count_by(trades, |t| t.exit_reason.as_str().to_string()),
            by_trade_type: count_by(trades, |t| t.trade_type.as_str().to_string()),
            by_combo: count_by(trades, |t| t.signal_combo_name.clone()),
        }
    }
}

// ─── Individual statistic functions ─────────────────────────────────

/// Win rate: fraction of trades that were winners.
pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Mean percent return per trade.
pub fn avg_pnl_pct(trades: &[TradeRecord]) -> f64 {
    mean(trades.iter().map(|t| t.pnl_pct))
}

/// Median percent return per trade (mean of the middle pair for even counts).
pub fn median_pnl_pct(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let mut values: Vec<f64> = trades.iter().map(|t| t.pnl_pct).collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

/// Profit factor: gross winning percent / gross losing percent.
///
/// Capped at 100.0 for edge cases (all winners, zero losses).
pub fn profit_factor(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.pnl_pct > 0.0)
        .map(|t| t.pnl_pct)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl_pct < 0.0)
        .map(|t| t.pnl_pct.abs())
        .sum();

    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { 100.0 } else { 0.0 };
    }
    (gross_profit / gross_loss).min(100.0)
}

/// Expectancy in R-multiples: mean of `pnl_pct` divided by the percent
/// risked to the initial stop.
///
/// Trades with a degenerate stop (at or above entry) are excluded.
pub fn expectancy(trades: &[TradeRecord]) -> f64 {
    let r_multiples: Vec<f64> = trades
        .iter()
        .filter_map(|t| {
            if t.entry_price <= 0.0 {
                return None;
            }
            let risk_pct = (t.entry_price - t.sl_price) / t.entry_price * 100.0;
            if risk_pct > 1e-10 {
                Some(t.pnl_pct / risk_pct)
            } else {
                None
            }
        })
        .collect();
    mean(r_multiples.into_iter())
}

/// Mean maximum favorable excursion, in entry-ATR units.
pub fn avg_mfe_atr(trades: &[TradeRecord]) -> f64 {
    mean(trades.iter().map(|t| t.mfe_atr))
}

/// Mean maximum adverse excursion, in entry-ATR units.
pub fn avg_mae_atr(trades: &[TradeRecord]) -> f64 {
    mean(trades.iter().map(|t| t.mae_atr))
}

/// Longest run of consecutive losing trades, in list order.
pub fn max_consecutive_losses(trades: &[TradeRecord]) -> usize {
    let mut max_streak = 0;
    let mut current = 0;

    for trade in trades {
        if trade.is_winner() {
            current = 0;
        } else {
            current += 1;
            if current > max_streak {
                max_streak = current;
            }
        }
    }
    max_streak
}

// ─── Helpers ────────────────────────────────────────────────────────

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}

fn count_by<F>(trades: &[TradeRecord], key: F) -> BTreeMap<String, usize>
where
    F: Fn(&TradeRecord) -> String,
{
    let mut counts = BTreeMap::new();
    for trade in trades {
        *counts.entry(key(trade)).or_insert(0) += 1;
    }
    counts
}
