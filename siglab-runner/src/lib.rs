//! siglab runner — scan orchestration on top of `siglab-core`.
//!
//! This crate builds on `siglab-core` to provide:
//! - TOML backtest configuration with content-addressed run IDs
//! - Single-series and batch scan runners producing `ScanReport`s
//! - Summary statistics over the trade list
//! - Artifact export: manifest.json, trades.csv, trades.json, summary.md

pub mod config;
pub mod reporting;
pub mod runner;
pub mod summary;

pub use config::{
    BacktestConfig, ConfigError, CooldownSection, DataSection, GateSection, RunId,
    SimulatorSection,
};
pub use reporting::{save_artifacts, ArtifactManager, ArtifactPaths, RunManifest};
pub use runner::{
    run_scan, run_scan_batch, run_scan_on_candles, RunError, ScanReport, SCHEMA_VERSION,
};
pub use summary::ScanSummary;

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
        assert_send::<ConfigError>();
        assert_sync::<ConfigError>();
    }

    #[test]
    fn scan_report_is_send_sync() {
        assert_send::<ScanReport>();
        assert_sync::<ScanReport>();
    }

    #[test]
    fn summary_is_send_sync() {
        assert_send::<ScanSummary>();
        assert_sync::<ScanSummary>();
    }

    #[test]
    fn artifact_manager_is_send_sync() {
        assert_send::<ArtifactManager>();
        assert_sync::<ArtifactManager>();
    }
}
