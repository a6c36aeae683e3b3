//! Scan runner — wires together config, engine, fingerprint, and summary.
//!
//! Three entry points:
//! - `run_scan()`: scans one enriched series. Pure compute, no I/O.
//! - `run_scan_on_candles()`: clips raw candles to the config's date range,
//!   enriches them, then scans. Used by the CLI.
//! - `run_scan_batch()`: scans several symbols in parallel. The engine
//!   creates cooldown state per scan and never shares it, so symbols are
//!   independent.

use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use siglab_core::data::enrich_candles;
use siglab_core::domain::{Candle, SignalBar, TradeRecord};
use siglab_core::engine::{scan_series, GateRejections, ScanError, SkipCounts};
use siglab_core::fingerprint::series_fingerprint;

use crate::config::{BacktestConfig, ConfigError, RunId};
use crate::summary::ScanSummary;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of one scan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    /// blake3 over the scanned candles; ties the report to exact data.
    pub dataset_fingerprint: String,
    /// Echo of the configuration that produced this report.
    pub config: BacktestConfig,
    pub bar_count: usize,
    pub summary: ScanSummary,
    pub skipped: SkipCounts,
    pub gate_rejections: GateRejections,
    pub warnings: Vec<String>,
    pub trades: Vec<TradeRecord>,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Scan one enriched series under one config.
///
/// The series must already be warm (indicators attached); use
/// [`run_scan_on_candles`] to go straight from raw candles.
pub fn run_scan(config: &BacktestConfig, bars: &[SignalBar]) -> Result<ScanReport, RunError> {
    config.validate()?;
    let outcome = scan_series(&config.scan_config(), bars)?;
    let summary = ScanSummary::compute(&outcome.trades);

    Ok(ScanReport {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        symbol: config.data.symbol.clone(),
        generated_at: Utc::now(),
        dataset_fingerprint: series_fingerprint(bars),
        config: config.clone(),
        bar_count: bars.len(),
        summary,
        skipped: outcome.skipped,
        gate_rejections: outcome.gate_rejections,
        warnings: outcome.warnings,
        trades: outcome.trades,
    })
}

/// Clip raw candles to the config's date range, enrich, and scan.
///
/// Data-quality warnings from enrichment are carried into the report ahead
/// of the scan's own warnings.
pub fn run_scan_on_candles(
    config: &BacktestConfig,
    candles: &[Candle],
) -> Result<ScanReport, RunError> {
    config.validate()?;
    let clipped = clip_to_range(candles, config.data.start, config.data.end);
    let enriched = enrich_candles(&clipped);
    let mut report = run_scan(config, &enriched.bars)?;

    if !enriched.warnings.is_empty() {
        let mut warnings = enriched.warnings;
        warnings.append(&mut report.warnings);
        report.warnings = warnings;
    }
    Ok(report)
}

/// Scan several symbols in parallel under one shared parameter set.
///
/// Each entry gets the config with its own symbol substituted, so run IDs
/// are per-symbol. A failed scan surfaces in its own slot and never aborts
/// the batch.
pub fn run_scan_batch(
    config: &BacktestConfig,
    series: &[(String, Vec<SignalBar>)],
) -> Vec<(String, Result<ScanReport, RunError>)> {
    series
        .par_iter()
        .map(|(symbol, bars)| {
            let mut per_symbol = config.clone();
            per_symbol.data.symbol = symbol.clone();
            (symbol.clone(), run_scan(&per_symbol, bars))
        })
        .collect()
}

/// Keep candles whose date falls inside the inclusive range.
fn clip_to_range(
    candles: &[Candle],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<Candle> {
    candles
        .iter()
        .filter(|c| {
            let date = c.timestamp.date_naive();
            start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
        })
        .cloned()
        .collect()
}
