//! Reporting and artifact export pipeline.

pub mod artifacts;
pub mod reports;

use std::path::Path;

use anyhow::Result;

use crate::runner::ScanReport;

pub use artifacts::{ArtifactManager, ArtifactPaths, RunManifest};
pub use reports::MarkdownReportGenerator;

/// Write the full artifact set for a report under `output_dir`.
pub fn save_artifacts(output_dir: impl AsRef<Path>, report: &ScanReport) -> Result<ArtifactPaths> {
    ArtifactManager::new(output_dir)?.save_run(report)
}
