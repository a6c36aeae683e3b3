//! Markdown report generator.

use crate::runner::ScanReport;

pub struct MarkdownReportGenerator;

impl MarkdownReportGenerator {
    pub fn generate(&self, report: &ScanReport) -> String {
        let summary = &report.summary;
        let mut out = format!(
            "# siglab Scan Report\n\n\
Run ID: `{}`\n\
Symbol: {}\n\
Generated: {}\n\
Dataset: `{}` ({} bars)\n\n\
## Summary\n\
- Trades: {}\n\
- Win rate: {:.1}%\n\
- Avg PnL: {:+.2}% (median {:+.2}%)\n\
- Profit factor: {:.2}\n\
- Expectancy: {:+.2} R\n\
- Avg MFE / MAE: {:.2} / {:.2} ATR\n\
- Max consecutive losses: {}\n",
            report.run_id,
            report.symbol,
            report.generated_at.to_rfc3339(),
            report.dataset_fingerprint,
            report.bar_count,
            summary.trade_count,
            summary.win_rate * 100.0,
            summary.avg_pnl_pct,
            summary.median_pnl_pct,
            summary.profit_factor,
            summary.expectancy,
            summary.avg_mfe_atr,
            summary.avg_mae_atr,
            summary.max_consecutive_losses
        );

        if !summary.by_exit_reason.is_empty() {
            out.push_str("\n## Exits\n\n| Reason | Count |\n|--------|-------|\n");
            for (reason, count) in &summary.by_exit_reason {
                out.push_str(&format!("| {} | {} |\n", reason, count));
            }
        }

        if !summary.by_combo.is_empty() {
            out.push_str("\n## Combos\n\n| Combo | Count |\n|-------|-------|\n");
            for (combo, count) in &summary.by_combo {
                out.push_str(&format!("| {} | {} |\n", combo, count));
            }
        }

        out.push_str(&format!(
            "\n## Coverage\n\
- Skipped: {} warm-up, {} horizon, {} malformed\n\
- Gate rejections: {} ({} cooldown, {} score, {} combo, {} trend, {} body, {} volatility)\n",
            report.skipped.insufficient_warmup,
            report.skipped.insufficient_horizon,
            report.skipped.malformed_bar,
            report.gate_rejections.total(),
            report.gate_rejections.cooldown_active,
            report.gate_rejections.score_below_threshold,
            report.gate_rejections.combo_not_allowed,
            report.gate_rejections.trend_misaligned,
            report.gate_rejections.weak_body,
            report.gate_rejections.low_volatility
        ));

        // Trade tape section (top 5 winners and losers)
        if !report.trades.is_empty() {
            let mut sorted: Vec<_> = report.trades.iter().collect();
            sorted.sort_by(|a, b| {
                b.pnl_pct
                    .partial_cmp(&a.pnl_pct)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            out.push_str("\n## Top Winners\n\n");
            out.push_str("| Entry | Combo | Exit | Bars | PnL |\n");
            out.push_str("|-------|-------|------|------|-----|\n");
            for trade in sorted.iter().take(5).filter(|t| t.pnl_pct > 0.0) {
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {:+.2}% |\n",
                    trade.timestamp.format("%Y-%m-%d %H:%M"),
                    trade.signal_combo_name,
                    trade.exit_reason.as_str(),
                    trade.duration_candles,
                    trade.pnl_pct
                ));
            }

            out.push_str("\n## Top Losers\n\n");
            out.push_str("| Entry | Combo | Exit | Bars | PnL |\n");
            out.push_str("|-------|-------|------|------|-----|\n");
            for trade in sorted.iter().rev().take(5).filter(|t| t.pnl_pct <= 0.0) {
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {:+.2}% |\n",
                    trade.timestamp.format("%Y-%m-%d %H:%M"),
                    trade.signal_combo_name,
                    trade.exit_reason.as_str(),
                    trade.duration_candles,
                    trade.pnl_pct
                ));
            }
        }

        if !report.warnings.is_empty() {
            out.push_str(&format!(
                "\n## Warnings ({})\n\n",
                report.warnings.len()
            ));
            for warning in report.warnings.iter().take(10) {
                out.push_str(&format!("- {}\n", warning));
            }
            if report.warnings.len() > 10 {
                out.push_str(&format!("- ... {} more\n", report.warnings.len() - 10));
            }
        }

        out.push_str("\n## Notes\n- Trade tape and manifest are exported alongside this report.\n");

        out
    }
}
