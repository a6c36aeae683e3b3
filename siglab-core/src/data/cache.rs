//! On-disk candle cache.
//!
//! Layout under the cache root: one `symbol=<SYMBOL>/` directory per
//! symbol (slashes in pair names become dashes), holding `bars.csv` and a
//! `meta.json` sidecar describing what the file covers. Writes go through
//! a `.tmp` rename so a crash never leaves a half-written cache, and
//! unreadable files are quarantined rather than silently reused.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ingest;
use super::provider::{DataError, DataSource};
use crate::domain::{validate_candles, Candle};
use crate::fingerprint;

const BARS_FILE: &str = "bars.csv";
const META_FILE: &str = "meta.json";

/// Sidecar metadata for one cached symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMeta {
    pub symbol: String,
    pub interval: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub candle_count: usize,
    /// blake3 hex digest of the candle rows.
    pub data_fingerprint: String,
    pub source: String,
    pub cached_at: DateTime<Utc>,
}

/// One row of `cache status` output.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub symbol: String,
    pub interval: String,
    pub candle_count: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub size_bytes: u64,
    pub cached_at: DateTime<Utc>,
}

/// How much of a requested date range the cache already holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverageResult {
    NotCached,
    FullyCovered,
    PartiallyCovered {
        cached_start: DateTime<Utc>,
        cached_end: DateTime<Utc>,
    },
}

/// Filesystem cache of fetched candles.
pub struct CandleCache {
    root: PathBuf,
}

impl CandleCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn symbol_dir(&self, symbol: &str) -> PathBuf {
        self.root.join(format!("symbol={}", symbol.replace('/', "-")))
    }

    /// Write candles and their metadata sidecar for a symbol, replacing any
    /// previous entry. Candles must be non-empty and strictly ordered.
    pub fn store(
        &self,
        symbol: &str,
        interval: &str,
        source: DataSource,
        candles: &[Candle],
    ) -> Result<CacheMeta, DataError> {
        if candles.is_empty() {
            return Err(DataError::ValidationError(format!(
                "refusing to cache an empty candle set for '{symbol}'"
            )));
        }
        validate_candles(candles).map_err(|e| DataError::ValidationError(e.to_string()))?;

        let dir = self.symbol_dir(symbol);
        fs::create_dir_all(&dir).map_err(|e| {
            DataError::CacheError(format!("failed to create {}: {e}", dir.display()))
        })?;

        let bars_path = dir.join(BARS_FILE);
        let bars_tmp = dir.join(format!("{BARS_FILE}.tmp"));
        ingest::write_candles_csv(&bars_tmp, candles)?;
        if let Err(e) = fs::rename(&bars_tmp, &bars_path) {
            let _ = fs::remove_file(&bars_tmp);
            return Err(DataError::CacheError(format!(
                "failed to commit {}: {e}",
                bars_path.display()
            )));
        }

        let meta = CacheMeta {
            symbol: symbol.to_string(),
            interval: interval.to_string(),
            start: candles[0].timestamp,
            end: candles[candles.len() - 1].timestamp,
            candle_count: candles.len(),
            data_fingerprint: fingerprint::dataset_fingerprint(candles),
            source: source.as_str().to_string(),
            cached_at: Utc::now(),
        };

        let meta_path = dir.join(META_FILE);
        let meta_tmp = dir.join(format!("{META_FILE}.tmp"));
        let json = serde_json::to_vec_pretty(&meta).expect("cache metadata must serialize");
        fs::write(&meta_tmp, &json).map_err(|e| {
            DataError::CacheError(format!("failed to write {}: {e}", meta_tmp.display()))
        })?;
        if let Err(e) = fs::rename(&meta_tmp, &meta_path) {
            let _ = fs::remove_file(&meta_tmp);
            return Err(DataError::CacheError(format!(
                "failed to commit {}: {e}",
                meta_path.display()
            )));
        }

        Ok(meta)
    }

    /// Load cached candles for a symbol. A file that fails to parse or
    /// validate is quarantined and reported as missing so the caller can
    /// re-fetch.
    pub fn load(&self, symbol: &str) -> Result<Vec<Candle>, DataError> {
        let bars_path = self.symbol_dir(symbol).join(BARS_FILE);
        if !bars_path.exists() {
            return Err(DataError::NoCachedData {
                symbol: symbol.to_string(),
            });
        }

        let loaded = ingest::read_candles_csv(&bars_path, symbol).and_then(|candles| {
            validate_candles(&candles).map_err(|e| DataError::ValidationError(e.to_string()))?;
            Ok(candles)
        });

        match loaded {
            Ok(candles) => Ok(candles),
            Err(err) => {
                quarantine(&bars_path, &err);
                Err(DataError::NoCachedData {
                    symbol: symbol.to_string(),
                })
            }
        }
    }

    pub fn get_meta(&self, symbol: &str) -> Option<CacheMeta> {
        read_meta_at(&self.symbol_dir(symbol))
    }

    /// Compare a requested date range against the cached metadata.
    pub fn covers_range(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CoverageResult {
        match self.get_meta(symbol) {
            None => CoverageResult::NotCached,
            Some(meta) if meta.start <= start && meta.end >= end => CoverageResult::FullyCovered,
            Some(meta) => CoverageResult::PartiallyCovered {
                cached_start: meta.start,
                cached_end: meta.end,
            },
        }
    }

    /// Summarize every cached symbol, sorted by symbol name. Directories
    /// with unreadable metadata are skipped.
    pub fn status(&self) -> Result<Vec<CacheStatus>, DataError> {
        let mut out = Vec::new();
        if !self.root.exists() {
            return Ok(out);
        }

        let entries = fs::read_dir(&self.root).map_err(|e| {
            DataError::CacheError(format!("failed to read {}: {e}", self.root.display()))
        })?;
        for entry in entries.flatten() {
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let is_symbol_dir = dir
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("symbol="));
            if !is_symbol_dir {
                continue;
            }
            let Some(meta) = read_meta_at(&dir) else {
                continue;
            };
            let size_bytes = fs::metadata(dir.join(BARS_FILE)).map(|m| m.len()).unwrap_or(0);
            out.push(CacheStatus {
                symbol: meta.symbol,
                interval: meta.interval,
                candle_count: meta.candle_count,
                start: meta.start,
                end: meta.end,
                size_bytes,
                cached_at: meta.cached_at,
            });
        }

        out.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(out)
    }

    /// Delete a symbol's cache entry. Returns false if nothing was cached.
    pub fn remove(&self, symbol: &str) -> Result<bool, DataError> {
        let dir = self.symbol_dir(symbol);
        if !dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir).map_err(|e| {
            DataError::CacheError(format!("failed to remove {}: {e}", dir.display()))
        })?;
        Ok(true)
    }
}

fn read_meta_at(dir: &Path) -> Option<CacheMeta> {
    let raw = fs::read(dir.join(META_FILE)).ok()?;
    serde_json::from_slice(&raw).ok()
}

/// Rename an unreadable cache file out of the way so the next fetch starts
/// clean, keeping the bytes around for inspection.
fn quarantine(path: &Path, err: &DataError) {
    let stamp = Utc::now().timestamp();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(BARS_FILE);
    let target = path.with_file_name(format!("{file_name}.corrupt-{stamp}"));
    if fs::rename(path, &target).is_err() {
        let _ = fs::remove_file(path);
    }
    eprintln!(
        "WARNING: quarantining corrupt cache file {}: {err}",
        path.display()
    );
}
