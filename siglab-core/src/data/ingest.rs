//! CSV ingest of raw candles.
//!
//! Schema: `timestamp,open,high,low,close,volume` with a header row.
//! Timestamps are RFC 3339 (`2024-03-01T09:30:00Z`) or integer epoch
//! milliseconds; the two forms may be mixed within one file. The symbol is
//! not a column: one file holds one symbol, supplied by the caller.

use std::io;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::provider::DataError;
use crate::domain::Candle;

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Serialize)]
struct CsvRowOut<'a> {
    timestamp: &'a str,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Parse a timestamp in either accepted form.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DataError> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(millis) = trimmed.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| DataError::IngestFailed(format!("epoch out of range: {millis}")));
    }
    Err(DataError::IngestFailed(format!(
        "unparseable timestamp '{trimmed}' (want RFC 3339 or epoch milliseconds)"
    )))
}

/// Read candles from any CSV source, stamping each with `symbol`.
pub fn read_candles_from(reader: impl io::Read, symbol: &str) -> Result<Vec<Candle>, DataError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut candles = Vec::new();

    for (line, row) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| DataError::IngestFailed(format!("row {}: {e}", line + 1)))?;
        candles.push(Candle {
            symbol: symbol.to_string(),
            timestamp: parse_timestamp(&row.timestamp)?,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }

    Ok(candles)
}

/// Read candles from a CSV file.
pub fn read_candles_csv(path: &Path, symbol: &str) -> Result<Vec<Candle>, DataError> {
    let file = std::fs::File::open(path)
        .map_err(|e| DataError::IngestFailed(format!("open {}: {e}", path.display())))?;
    read_candles_from(file, symbol)
}

/// Write candles to any CSV sink in the ingest schema. Timestamps are
/// written as RFC 3339 seconds, so a written file reads back identically.
pub fn write_candles_to(writer: impl io::Write, candles: &[Candle]) -> Result<(), DataError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for candle in candles {
        let ts = candle
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        csv_writer
            .serialize(CsvRowOut {
                timestamp: &ts,
                open: candle.open,
                high: candle.high,
                low: candle.low,
                close: candle.close,
                volume: candle.volume,
            })
            .map_err(|e| DataError::IngestFailed(format!("serialize row: {e}")))?;
    }
    csv_writer
        .flush()
        .map_err(|e| DataError::IngestFailed(format!("flush: {e}")))?;
    Ok(())
}

/// Write candles to a CSV file.
pub fn write_candles_csv(path: &Path, candles: &[Candle]) -> Result<(), DataError> {
    let file = std::fs::File::create(path)
        .map_err(|e| DataError::IngestFailed(format!("create {}: {e}", path.display())))?;
    write_candles_to(file, candles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn reads_rfc3339_timestamps() {
        let csv = "timestamp,open,high,low,close,volume\n\
                   2024-03-01T09:30:00Z,100.0,101.0,99.5,100.5,1200\n\
                   2024-03-01T09:31:00Z,100.5,102.0,100.0,101.5,900\n";
        let candles = read_candles_from(csv.as_bytes(), "ETH/USDT").unwrap();

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].symbol, "ETH/USDT");
        assert_eq!(
            candles[0].timestamp,
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
        );
        assert_eq!(candles[1].close, 101.5);
        assert_eq!(candles[1].volume, 900.0);
    }

    #[test]
    fn reads_epoch_millisecond_timestamps() {
        // 2024-03-01T09:30:00Z = 1709285400000 ms
        let csv = "timestamp,open,high,low,close,volume\n\
                   1709285400000,100.0,101.0,99.5,100.5,1200\n";
        let candles = read_candles_from(csv.as_bytes(), "ETH/USDT").unwrap();
        assert_eq!(
            candles[0].timestamp,
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn mixed_timestamp_forms_in_one_file() {
        let csv = "timestamp,open,high,low,close,volume\n\
                   2024-03-01T09:30:00Z,100.0,101.0,99.5,100.5,1200\n\
                   1709285460000,100.5,102.0,100.0,101.5,900\n";
        let candles = read_candles_from(csv.as_bytes(), "ETH/USDT").unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(
            candles[1].timestamp,
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 31, 0).unwrap()
        );
    }

    #[test]
    fn rejects_garbage_timestamp() {
        let csv = "timestamp,open,high,low,close,volume\n\
                   yesterday,100.0,101.0,99.5,100.5,1200\n";
        let err = read_candles_from(csv.as_bytes(), "ETH/USDT").unwrap_err();
        assert!(matches!(err, DataError::IngestFailed(_)));
    }

    #[test]
    fn rejects_non_numeric_price() {
        let csv = "timestamp,open,high,low,close,volume\n\
                   2024-03-01T09:30:00Z,abc,101.0,99.5,100.5,1200\n";
        let err = read_candles_from(csv.as_bytes(), "ETH/USDT").unwrap_err();
        assert!(matches!(err, DataError::IngestFailed(_)));
    }

    #[test]
    fn empty_file_reads_as_empty() {
        let csv = "timestamp,open,high,low,close,volume\n";
        let candles = read_candles_from(csv.as_bytes(), "ETH/USDT").unwrap();
        assert!(candles.is_empty());
    }

    #[test]
    fn write_then_read_roundtrip() {
        let original = vec![
            Candle {
                symbol: "ETH/USDT".into(),
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
                open: 100.0,
                high: 101.25,
                low: 99.5,
                close: 100.625,
                volume: 1234.5,
            },
            Candle {
                symbol: "ETH/USDT".into(),
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 31, 0).unwrap(),
                open: 100.625,
                high: 102.0,
                low: 100.0,
                close: 101.5,
                volume: 900.0,
            },
        ];

        let mut buffer = Vec::new();
        write_candles_to(&mut buffer, &original).unwrap();
        let read_back = read_candles_from(buffer.as_slice(), "ETH/USDT").unwrap();

        assert_eq!(read_back.len(), 2);
        for (a, b) in original.iter().zip(read_back.iter()) {
            assert_eq!(a.timestamp, b.timestamp);
            assert_eq!(a.open, b.open);
            assert_eq!(a.high, b.high);
            assert_eq!(a.low, b.low);
            assert_eq!(a.close, b.close);
            assert_eq!(a.volume, b.volume);
        }
    }
}
