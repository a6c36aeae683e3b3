//! Run manifest export (JSON).

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use siglab_core::engine::{GateRejections, SkipCounts};

use crate::config::BacktestConfig;
use crate::runner::ScanReport;
use crate::summary::ScanSummary;

/// Everything about a run except the trade tape itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub run_id: String,
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    pub dataset_fingerprint: String,
    pub config: BacktestConfig,
    pub bar_count: usize,
    pub summary: ScanSummary,
    pub skipped: SkipCounts,
    pub gate_rejections: GateRejections,
    pub warnings: Vec<String>,
}

pub fn write_manifest(path: &Path, report: &ScanReport) -> Result<()> {
    let manifest = RunManifest {
        schema_version: report.schema_version,
        run_id: report.run_id.clone(),
        symbol: report.symbol.clone(),
        generated_at: report.generated_at,
        dataset_fingerprint: report.dataset_fingerprint.clone(),
        config: report.config.clone(),
        bar_count: report.bar_count,
        summary: report.summary.clone(),
        skipped: report.skipped,
        gate_rejections: report.gate_rejections,
        warnings: report.warnings.clone(),
    };

    let json = serde_json::to_string_pretty(&manifest).context("failed to serialize manifest")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write manifest to {}", path.display()))?;
    Ok(())
}
