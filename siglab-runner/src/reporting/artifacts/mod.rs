//! Artifact manager for persisting run outputs.

mod manifest;
mod trades;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::reporting::reports::MarkdownReportGenerator;
use crate::runner::ScanReport;

pub use manifest::RunManifest;

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub manifest: PathBuf,
    pub trades_csv: PathBuf,
    pub trades_json: PathBuf,
    pub summary_md: PathBuf,
}

/// Manages writing all artifacts for a run.
///
/// Every run gets its own directory named by run ID, so re-running an
/// identical config overwrites its previous artifacts in place.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .context("failed to create artifact output directory")?;
        Ok(Self { output_dir })
    }

    /// Save the complete artifact set for a report.
    pub fn save_run(&self, report: &ScanReport) -> Result<ArtifactPaths> {
        let run_dir = self.output_dir.join(&report.run_id);
        std::fs::create_dir_all(&run_dir)
            .with_context(|| format!("failed to create run directory {}", run_dir.display()))?;

        let manifest_path = run_dir.join("manifest.json");
        manifest::write_manifest(&manifest_path, report)?;

        let trades_csv = run_dir.join("trades.csv");
        let trades_json = run_dir.join("trades.json");
        trades::write_trades_csv(&trades_csv, &report.trades)?;
        trades::write_trades_json(&trades_json, &report.trades)?;

        let summary_md = run_dir.join("summary.md");
        let rendered = MarkdownReportGenerator.generate(report);
        std::fs::write(&summary_md, rendered)
            .with_context(|| format!("failed to write report to {}", summary_md.display()))?;

        Ok(ArtifactPaths {
            run_dir,
            manifest: manifest_path,
            trades_csv,
            trades_json,
            summary_md,
        })
    }
}
