//! Data acquisition, caching, and enrichment.
//!
//! Candles enter through a [`CandleProvider`] (KuCoin, CSV import, or the
//! seeded synthetic generator), land in the on-disk [`CandleCache`], and
//! leave as indicator-enriched [`crate::domain::SignalBar`] series via
//! [`enrich_candles`].

pub mod cache;
pub mod download;
pub mod enrich;
pub mod ingest;
pub mod kucoin;
pub mod provider;
pub mod synthetic;

pub use cache::{CacheMeta, CacheStatus, CandleCache, CoverageResult};
pub use download::{fetch_symbols, FetchSummary};
pub use enrich::{enrich_candles, EnrichedSeries};
pub use ingest::{read_candles_csv, write_candles_csv};
pub use kucoin::KuCoinProvider;
pub use provider::{
    CandleProvider, DataError, DataSource, DownloadProgress, FetchResult, StdoutProgress,
};
pub use synthetic::{synthetic_candles, SyntheticProvider};
