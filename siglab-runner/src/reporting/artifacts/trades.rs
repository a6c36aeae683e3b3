//! Trade tape export (CSV/JSON).
//!
//! The CSV column order is the `TradeRecord` field order and is a wire
//! contract for downstream notebooks; rounded floats keep their four
//! decimals. `trades.json` carries the same records at full precision.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::SecondsFormat;

use siglab_core::domain::TradeRecord;

pub fn write_trades_csv(path: &Path, trades: &[TradeRecord]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("failed to create trades CSV {}", path.display()))?;

    writeln!(
        file,
        "timestamp,symbol,entry_price,exit_price,exit_reason,duration_candles,\
         pnl_pct,was_profitable,trade_type,tp_price,sl_price,atr_on_exit,\
         mfe_atr,mae_atr,match_score,rsi_bounce,macd_cross_up,recent_high_break,\
         range_breakout,strong_candle,volume_spike,signal_combo_name,logic_debug_note"
    )?;

    for trade in trades {
        writeln!(
            file,
            "{},{},{:.4},{:.4},{},{},{:.4},{},{},{:.4},{:.4},{:.4},{:.4},{:.4},{},{},{},{},{},{},{},{},{}",
            trade.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            trade.symbol,
            trade.entry_price,
            trade.exit_price,
            trade.exit_reason.as_str(),
            trade.duration_candles,
            trade.pnl_pct,
            trade.was_profitable,
            trade.trade_type.as_str(),
            trade.tp_price,
            trade.sl_price,
            trade.atr_on_exit,
            trade.mfe_atr,
            trade.mae_atr,
            trade.match_score,
            trade.rsi_bounce,
            trade.macd_cross_up,
            trade.recent_high_break,
            trade.range_breakout,
            trade.strong_candle,
            trade.volume_spike,
            trade.signal_combo_name,
            trade.logic_debug_note
        )?;
    }

    Ok(())
}

pub fn write_trades_json(path: &Path, trades: &[TradeRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(trades).context("failed to serialize trades")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write trades JSON {}", path.display()))?;
    Ok(())
}
