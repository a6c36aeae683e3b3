//! Trade recording — ordered accumulation of completed simulations.

use super::gate::Candidate;
use super::simulator::TradeOutcome;
use crate::domain::{SignalBar, TradeRecord};

/// Collects one `TradeRecord` per completed simulation, in entry order.
#[derive(Debug, Default)]
pub struct TradeRecorder {
    trades: Vec<TradeRecord>,
    last_entry_index: Option<usize>,
}

impl TradeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the entry bar, the gate's candidate, and the simulation outcome
    /// into one record. Entries must arrive in strictly increasing index
    /// order; the scan loop guarantees this.
    pub fn record(&mut self, entry_bar: &SignalBar, candidate: &Candidate, outcome: &TradeOutcome) {
        if let Some(prev) = self.last_entry_index {
            assert!(
                candidate.index > prev,
                "trade entries must be recorded in increasing index order"
            );
        }
        self.last_entry_index = Some(candidate.index);

        let logic_debug_note = format!(
            "Score: {} | TP: {:.2} | SL: {:.2} | RSI: {:.2} | Dur: {}",
            candidate.score.match_score,
            outcome.tp_price,
            outcome.sl_price,
            candidate.rsi_at_entry,
            outcome.duration,
        );

        let filters = &candidate.score.filters;
        self.trades.push(TradeRecord {
            timestamp: entry_bar.candle.timestamp,
            symbol: entry_bar.candle.symbol.clone(),
            entry_price: candidate.entry_price,
            exit_price: outcome.exit_price,
            exit_reason: outcome.exit_reason,
            duration_candles: outcome.duration,
            pnl_pct: outcome.pnl_pct,
            was_profitable: outcome.was_profitable,
            trade_type: outcome.trade_type,
            tp_price: outcome.tp_price,
            sl_price: outcome.sl_price,
            atr_on_exit: outcome.atr_on_exit,
            mfe_atr: outcome.mfe_atr,
            mae_atr: outcome.mae_atr,
            match_score: candidate.score.match_score,
            rsi_bounce: filters.rsi_bounce,
            macd_cross_up: filters.macd_cross_up,
            recent_high_break: filters.recent_high_break,
            range_breakout: filters.range_breakout,
            strong_candle: filters.strong_candle,
            volume_spike: filters.volume_spike,
            signal_combo_name: candidate.score.signal_combo_name.clone(),
            logic_debug_note,
        });
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn into_trades(self) -> Vec<TradeRecord> {
        self.trades
    }
}
