//! Serializable backtest configuration.
//!
//! A `BacktestConfig` is the complete description of one scan: which data
//! to run over and every engine knob. The TOML surface mirrors the engine
//! layers (`[data]`, `[gate]`, `[simulator]`, `[cooldown]`); omitted keys
//! fall back to the tuned defaults from `ScanConfig::default()`, so a
//! minimal config is just a `[data]` table with a symbol.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use siglab_core::engine::{ScanConfig, ScanConfigError};

/// Unique identifier for a scan run (content-addressable hash).
pub type RunId = String;

/// Errors raised while loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("data.symbol must not be empty")]
    EmptySymbol,
    #[error("data.start {start} is after data.end {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },
    #[error("unknown preset '{0}' (available: combo_scalp, baseline)")]
    UnknownPreset(String),
    #[error(transparent)]
    Engine(#[from] ScanConfigError),
}

/// Complete configuration for a single scan run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub data: DataSection,
    #[serde(default)]
    pub gate: GateSection,
    #[serde(default)]
    pub simulator: SimulatorSection,
    #[serde(default)]
    pub cooldown: CooldownSection,
}

/// `[data]` — what to scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSection {
    pub symbol: String,
    /// CSV file to scan instead of the cache.
    #[serde(default)]
    pub source: Option<PathBuf>,
    /// Candle cache root; used when `source` is unset.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Inclusive date range; unset bounds mean "whatever the data has".
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

/// `[gate]` — entry filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSection {
    pub score_threshold: u32,
    /// Canonical combo names allowed to trade. TOML cannot express an
    /// explicit "unset", so an empty list lifts the restriction.
    pub allowed_combos: BTreeSet<String>,
    pub body_fraction: f64,
    pub min_atr: f64,
}

impl Default for GateSection {
    fn default() -> Self {
        let scan = ScanConfig::default();
        Self {
            score_threshold: scan.score_threshold,
            allowed_combos: scan.allowed_combos.unwrap_or_default(),
            body_fraction: scan.body_fraction,
            min_atr: scan.min_atr,
        }
    }
}

/// `[simulator]` — exit levels and horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorSection {
    pub tp_k_base: f64,
    pub sl_k_base: f64,
    pub max_duration: usize,
    pub strong_score_threshold: u32,
    pub tp_k_strong: f64,
    pub sl_k_strong: f64,
}

impl Default for SimulatorSection {
    fn default() -> Self {
        let scan = ScanConfig::default();
        Self {
            tp_k_base: scan.tp_k_base,
            sl_k_base: scan.sl_k_base,
            max_duration: scan.max_duration,
            strong_score_threshold: scan.strong_score_threshold,
            tp_k_strong: scan.tp_k_strong,
            sl_k_strong: scan.sl_k_strong,
        }
    }
}

/// `[cooldown]` — post-loss blocking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownSection {
    pub cooldown_duration: usize,
}

impl Default for CooldownSection {
    fn default() -> Self {
        Self {
            cooldown_duration: ScanConfig::default().cooldown_duration,
        }
    }
}

impl BacktestConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse and validate a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a named preset config for a symbol.
    ///
    /// Presets are rendered to TOML and re-parsed so they travel the same
    /// parse/validate path as user config files.
    pub fn preset(
        name: &str,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, ConfigError> {
        let mut text = format!("[data]\nsymbol = \"{symbol}\"\n");
        if let Some(start) = start {
            text.push_str(&format!("start = \"{start}\"\n"));
        }
        if let Some(end) = end {
            text.push_str(&format!("end = \"{end}\"\n"));
        }
        match name {
            // The tuned strategy; identical to the section defaults.
            "combo_scalp" => {}
            "baseline" => {
                text.push_str("\n[gate]\nscore_threshold = 4\nallowed_combos = []\n");
            }
            other => return Err(ConfigError::UnknownPreset(other.to_string())),
        }
        Self::from_toml(&text)
    }

    /// Rejects configs the runner cannot execute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        if let (Some(start), Some(end)) = (self.data.start, self.data.end) {
            if start > end {
                return Err(ConfigError::InvertedDateRange { start, end });
            }
        }
        self.scan_config().validate()?;
        Ok(())
    }

    /// Flatten the section layout into the engine's parameter struct.
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            score_threshold: self.gate.score_threshold,
            tp_k_base: self.simulator.tp_k_base,
            sl_k_base: self.simulator.sl_k_base,
            max_duration: self.simulator.max_duration,
            cooldown_duration: self.cooldown.cooldown_duration,
            allowed_combos: if self.gate.allowed_combos.is_empty() {
                None
            } else {
                Some(self.gate.allowed_combos.clone())
            },
            body_fraction: self.gate.body_fraction,
            min_atr: self.gate.min_atr,
            strong_score_threshold: self.simulator.strong_score_threshold,
            tp_k_strong: self.simulator.tp_k_strong,
            sl_k_strong: self.simulator.sl_k_strong,
        }
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs get the same RunId, so artifacts
    /// land in the same directory and results are directly comparable.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("BacktestConfig serialization failed");
        let hash = blake3::hash(json.as_bytes());
        format!("{}", hash.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> BacktestConfig {
        BacktestConfig::from_toml("[data]\nsymbol = \"ETH/USDT\"\n").unwrap()
    }

    #[test]
    fn minimal_config_uses_tuned_defaults() {
        let config = minimal();
        assert_eq!(config.scan_config(), ScanConfig::default());
        assert_eq!(config.data.symbol, "ETH/USDT");
        assert!(config.data.source.is_none());
        assert!(config.data.start.is_none());
    }

    #[test]
    fn full_config_parses_every_section() {
        let text = r#"
[data]
symbol = "BTC/USDT"
source = "candles.csv"
start = "2024-01-01"
end = "2024-03-01"

[gate]
score_threshold = 3
allowed_combos = ["macd_cross_up+rsi_bounce", "rsi_bounce+strong_candle"]
body_fraction = 0.2
min_atr = 0.5

[simulator]
tp_k_base = 2.0
sl_k_base = 1.0
max_duration = 5
strong_score_threshold = 6
tp_k_strong = 2.5
sl_k_strong = 0.9

[cooldown]
cooldown_duration = 7
"#;
        let config = BacktestConfig::from_toml(text).unwrap();
        let scan = config.scan_config();
        assert_eq!(scan.score_threshold, 3);
        assert_eq!(scan.max_duration, 5);
        assert_eq!(scan.cooldown_duration, 7);
        assert_eq!(scan.tp_k_strong, 2.5);
        assert_eq!(
            config.data.start,
            Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        let combos = scan.allowed_combos.unwrap();
        assert_eq!(combos.len(), 2);
        assert!(combos.contains("rsi_bounce+strong_candle"));
    }

    #[test]
    fn empty_allow_list_lifts_the_restriction() {
        let text = "[data]\nsymbol = \"ETH/USDT\"\n\n[gate]\nallowed_combos = []\n";
        let config = BacktestConfig::from_toml(text).unwrap();
        assert_eq!(config.scan_config().allowed_combos, None);
    }

    #[test]
    fn empty_symbol_is_rejected() {
        let err = BacktestConfig::from_toml("[data]\nsymbol = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::EmptySymbol));
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let text = "[data]\nsymbol = \"ETH/USDT\"\nstart = \"2024-03-01\"\nend = \"2024-01-01\"\n";
        let err = BacktestConfig::from_toml(text).unwrap_err();
        assert!(matches!(err, ConfigError::InvertedDateRange { .. }));
    }

    #[test]
    fn engine_validation_surfaces_through_config() {
        let text = "[data]\nsymbol = \"ETH/USDT\"\n\n[simulator]\nmax_duration = 0\n";
        let err = BacktestConfig::from_toml(text).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Engine(ScanConfigError::ZeroDuration)
        ));
    }

    #[test]
    fn garbled_toml_is_a_parse_error() {
        let err = BacktestConfig::from_toml("[data\nsymbol =").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn run_id_is_deterministic() {
        let config = minimal();
        assert_eq!(config.run_id(), config.run_id());
        assert_eq!(config.run_id().len(), 64);
    }

    #[test]
    fn run_id_changes_with_any_knob() {
        let base = minimal();
        let mut tweaked = base.clone();
        tweaked.simulator.tp_k_base = 2.0;
        assert_ne!(base.run_id(), tweaked.run_id());

        let mut other_symbol = base.clone();
        other_symbol.data.symbol = "BTC/USDT".to_string();
        assert_ne!(base.run_id(), other_symbol.run_id());
    }

    #[test]
    fn combo_scalp_preset_equals_the_defaults() {
        let preset = BacktestConfig::preset("combo_scalp", "ETH/USDT", None, None).unwrap();
        assert_eq!(preset.scan_config(), ScanConfig::default());
        assert_eq!(preset.data.symbol, "ETH/USDT");
    }

    #[test]
    fn baseline_preset_drops_the_allow_list() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let preset = BacktestConfig::preset("baseline", "SOL/USDT", Some(start), None).unwrap();
        let scan = preset.scan_config();
        assert_eq!(scan.score_threshold, 4);
        assert_eq!(scan.allowed_combos, None);
        assert_eq!(preset.data.start, Some(start));
        // Everything else stays at the tuned defaults.
        assert_eq!(scan.tp_k_base, ScanConfig::default().tp_k_base);
    }

    #[test]
    fn unknown_preset_is_rejected() {
        let err = BacktestConfig::preset("yolo", "ETH/USDT", None, None).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPreset(name) if name == "yolo"));
    }

    #[test]
    fn config_toml_roundtrip() {
        let config = minimal();
        let text = toml::to_string(&config).unwrap();
        let back = BacktestConfig::from_toml(&text).unwrap();
        assert_eq!(config, back);
        assert_eq!(config.run_id(), back.run_id());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = BacktestConfig::from_file("/nonexistent/siglab.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
