//! KuCoin spot klines provider.
//!
//! Fetches candles from the public `/api/v1/market/candles` endpoint
//! (reqwest, blocking). The endpoint caps each response at 1500 rows and
//! returns them newest-first, so a date range is walked in paginated
//! chunks, merged oldest-first, and deduplicated by timestamp. Requests are
//! paced with a short delay and retried with exponential backoff; HTTP 429
//! surfaces as `DataError::RateLimited`.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::provider::{CandleProvider, DataError, DataSource, FetchResult};
use crate::domain::Candle;

const BASE_URL: &str = "https://api.kucoin.com";

/// Maximum rows KuCoin returns per request.
const PAGE_LIMIT: i64 = 1500;

/// KuCoin klines response envelope. `data` rows are
/// `[time, open, close, high, low, volume, turnover]` as strings, with
/// `time` in epoch seconds.
#[derive(Debug, Deserialize)]
struct KlinesResponse {
    code: String,
    msg: Option<String>,
    data: Option<Vec<Vec<String>>>,
}

/// Seconds per candle for a KuCoin interval name.
pub fn interval_step(interval: &str) -> Option<i64> {
    match interval {
        "1min" => Some(60),
        "3min" => Some(180),
        "5min" => Some(300),
        "15min" => Some(900),
        "30min" => Some(1800),
        "1hour" => Some(3600),
        "4hour" => Some(14_400),
        "1day" => Some(86_400),
        _ => None,
    }
}

/// KuCoin spells pairs with a dash: `ETH/USDT` -> `ETH-USDT`.
fn api_symbol(symbol: &str) -> String {
    symbol.replace('/', "-")
}

/// KuCoin spot market data provider.
pub struct KuCoinProvider {
    client: reqwest::blocking::Client,
    interval: String,
    step_secs: i64,
    max_retries: u32,
    base_delay: Duration,
    page_delay: Duration,
}

impl KuCoinProvider {
    /// Provider for 1-minute candles.
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("siglab/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            interval: "1min".to_string(),
            step_secs: 60,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            page_delay: Duration::from_millis(400),
        }
    }

    /// Switch to another supported interval.
    pub fn with_interval(mut self, interval: &str) -> Result<Self, DataError> {
        let step = interval_step(interval).ok_or_else(|| {
            DataError::ValidationError(format!("unsupported KuCoin interval '{interval}'"))
        })?;
        self.interval = interval.to_string();
        self.step_secs = step;
        Ok(self)
    }

    pub fn interval(&self) -> &str {
        &self.interval
    }

    fn klines_url(&self, symbol: &str, start_ts: i64, end_ts: i64) -> String {
        format!(
            "{BASE_URL}/api/v1/market/candles?type={}&symbol={}&startAt={start_ts}&endAt={end_ts}",
            self.interval,
            api_symbol(symbol),
        )
    }

    /// Turn one kline row into a candle.
    fn parse_row(symbol: &str, row: &[String]) -> Result<Candle, DataError> {
        if row.len() < 6 {
            return Err(DataError::ResponseFormatChanged(format!(
                "kline row has {} fields, expected at least 6",
                row.len()
            )));
        }

        let secs: i64 = row[0].parse().map_err(|_| {
            DataError::ResponseFormatChanged(format!("bad kline timestamp: '{}'", row[0]))
        })?;
        let timestamp = DateTime::from_timestamp(secs, 0).ok_or_else(|| {
            DataError::ResponseFormatChanged(format!("kline timestamp out of range: {secs}"))
        })?;

        let price = |idx: usize, name: &str| -> Result<f64, DataError> {
            row[idx].parse().map_err(|_| {
                DataError::ResponseFormatChanged(format!("bad kline {name}: '{}'", row[idx]))
            })
        };

        Ok(Candle {
            symbol: symbol.to_string(),
            timestamp,
            open: price(1, "open")?,
            high: price(3, "high")?,
            low: price(4, "low")?,
            close: price(2, "close")?,
            volume: price(5, "volume")?,
        })
    }

    /// Parse a response envelope into ascending candles.
    fn parse_response(symbol: &str, resp: KlinesResponse) -> Result<Vec<Candle>, DataError> {
        if resp.code != "200000" {
            let msg = resp.msg.unwrap_or_default();
            return Err(if resp.code == "400100" {
                DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                }
            } else {
                DataError::ResponseFormatChanged(format!("KuCoin code {}: {msg}", resp.code))
            });
        }

        let rows = resp.data.unwrap_or_default();
        let mut candles = Vec::with_capacity(rows.len());
        for row in &rows {
            candles.push(Self::parse_row(symbol, row)?);
        }
        candles.sort_by_key(|c| c.timestamp);
        Ok(candles)
    }

    /// One paginated request with retry and backoff.
    fn fetch_page(
        &self,
        symbol: &str,
        start_ts: i64,
        end_ts: i64,
    ) -> Result<Vec<Candle>, DataError> {
        let url = self.klines_url(symbol, start_ts, end_ts);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                std::thread::sleep(delay);
            }

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(10);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if !status.is_success() {
                        last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                        continue;
                    }

                    let klines: KlinesResponse = resp.json().map_err(|e| {
                        DataError::ResponseFormatChanged(format!(
                            "failed to parse response for {symbol}: {e}"
                        ))
                    })?;

                    return Self::parse_response(symbol, klines);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl Default for KuCoinProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CandleProvider for KuCoinProvider {
    fn name(&self) -> &str {
        "kucoin"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<FetchResult, DataError> {
        let start_ts = start.timestamp();
        let end_ts = end.timestamp();
        let mut merged: BTreeMap<i64, Candle> = BTreeMap::new();
        let mut cursor = start_ts;

        while cursor < end_ts {
            let page_end = end_ts.min(cursor + self.step_secs * PAGE_LIMIT);
            let page = self.fetch_page(symbol, cursor, page_end)?;

            if page.is_empty() {
                // Nothing listed in this chunk (pair not trading yet, or a
                // gap); move past it rather than refetching forever.
                cursor = page_end;
                if cursor >= end_ts {
                    break;
                }
                std::thread::sleep(self.page_delay);
                continue;
            }

            let newest = page
                .iter()
                .map(|c| c.timestamp.timestamp())
                .max()
                .unwrap_or(cursor);
            for candle in page {
                // Later fetches win on duplicate timestamps.
                merged.insert(candle.timestamp.timestamp(), candle);
            }

            let next = newest + self.step_secs;
            if next <= cursor {
                break;
            }
            cursor = next;
            if cursor >= end_ts {
                break;
            }
            std::thread::sleep(self.page_delay);
        }

        if merged.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        Ok(FetchResult {
            symbol: symbol.to_string(),
            candles: merged.into_values().collect(),
            source: DataSource::KuCoin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(secs: i64, open: &str, close: &str, high: &str, low: &str, vol: &str) -> Vec<String> {
        vec![
            secs.to_string(),
            open.into(),
            close.into(),
            high.into(),
            low.into(),
            vol.into(),
            "0".into(), // turnover, unused
        ]
    }

    #[test]
    fn interval_steps() {
        assert_eq!(interval_step("1min"), Some(60));
        assert_eq!(interval_step("1hour"), Some(3600));
        assert_eq!(interval_step("1day"), Some(86_400));
        assert_eq!(interval_step("2min"), None);
    }

    #[test]
    fn symbol_mapping() {
        assert_eq!(api_symbol("ETH/USDT"), "ETH-USDT");
        assert_eq!(api_symbol("BTC-USDT"), "BTC-USDT");
    }

    #[test]
    fn parses_kline_row_field_order() {
        // KuCoin order is [time, open, close, high, low, volume].
        let candle =
            KuCoinProvider::parse_row("ETH/USDT", &row(1_709_285_400, "100", "101", "102", "99", "1200"))
                .unwrap();
        assert_eq!(candle.symbol, "ETH/USDT");
        assert_eq!(candle.timestamp.timestamp(), 1_709_285_400);
        assert_eq!(candle.open, 100.0);
        assert_eq!(candle.close, 101.0);
        assert_eq!(candle.high, 102.0);
        assert_eq!(candle.low, 99.0);
        assert_eq!(candle.volume, 1200.0);
    }

    #[test]
    fn short_row_is_a_format_error() {
        let err = KuCoinProvider::parse_row("ETH/USDT", &["1".to_string(), "2".to_string()])
            .unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(_)));
    }

    #[test]
    fn non_numeric_field_is_a_format_error() {
        let err = KuCoinProvider::parse_row(
            "ETH/USDT",
            &row(1_709_285_400, "abc", "101", "102", "99", "1200"),
        )
        .unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(_)));
    }

    #[test]
    fn response_rows_come_back_ascending() {
        // KuCoin returns newest-first; parse_response re-sorts.
        let resp = KlinesResponse {
            code: "200000".into(),
            msg: None,
            data: Some(vec![
                row(1_709_285_460, "101", "102", "103", "100", "900"),
                row(1_709_285_400, "100", "101", "102", "99", "1200"),
            ]),
        };
        let candles = KuCoinProvider::parse_response("ETH/USDT", resp).unwrap();
        assert_eq!(candles.len(), 2);
        assert!(candles[0].timestamp < candles[1].timestamp);
    }

    #[test]
    fn unknown_symbol_code_maps_to_symbol_not_found() {
        let resp = KlinesResponse {
            code: "400100".into(),
            msg: Some("This symbol is not supported".into()),
            data: None,
        };
        let err = KuCoinProvider::parse_response("NOPE/USDT", resp).unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }

    #[test]
    fn other_error_code_is_a_format_error() {
        let resp = KlinesResponse {
            code: "500000".into(),
            msg: Some("internal error".into()),
            data: None,
        };
        let err = KuCoinProvider::parse_response("ETH/USDT", resp).unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(_)));
    }

    #[test]
    fn rejects_unsupported_interval() {
        assert!(matches!(
            KuCoinProvider::new().with_interval("7min"),
            Err(DataError::ValidationError(_))
        ));
    }
}
