//! Dataset fingerprints.
//!
//! A fingerprint is the blake3 hex digest of a candle sequence, computed
//! over each candle's canonical JSON row. It names exactly which data a
//! scan ran against: cache metadata stores it at fetch time and every scan
//! report repeats it, so two reports are comparable only when the digests
//! match. Enrichment does not change identity, a series of signal bars
//! fingerprints the same as the candles it was built from.

use blake3::Hasher;

use crate::domain::{Candle, SignalBar};

fn hash_candles<'a>(candles: impl Iterator<Item = &'a Candle>) -> String {
    let mut hasher = Hasher::new();
    for candle in candles {
        let bytes = serde_json::to_vec(candle).expect("candle must serialize");
        hasher.update(&bytes);
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

/// Fingerprint of a raw candle sequence.
pub fn dataset_fingerprint(candles: &[Candle]) -> String {
    hash_candles(candles.iter())
}

/// Fingerprint of an enriched series, ignoring the indicator columns.
pub fn series_fingerprint(bars: &[SignalBar]) -> String {
    hash_candles(bars.iter().map(|bar| &bar.candle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_candles(count: usize) -> Vec<Candle> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        (0..count)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.7).sin();
                Candle {
                    symbol: "ETH/USDT".to_string(),
                    timestamp: base + chrono::Duration::minutes(i as i64),
                    open: close - 0.2,
                    high: close + 0.5,
                    low: close - 0.6,
                    close,
                    volume: 1_000.0 + i as f64,
                }
            })
            .collect()
    }

    fn bare_bar(candle: Candle) -> SignalBar {
        SignalBar {
            candle,
            atr: f64::NAN,
            rsi: f64::NAN,
            macd: f64::NAN,
            macd_signal: f64::NAN,
            macd_histogram: f64::NAN,
            ema_9: f64::NAN,
            ema_20: f64::NAN,
            bb_upper: f64::NAN,
            bb_middle: f64::NAN,
            bb_lower: f64::NAN,
        }
    }

    #[test]
    fn same_candles_same_digest() {
        let candles = make_candles(50);
        assert_eq!(dataset_fingerprint(&candles), dataset_fingerprint(&candles));
    }

    #[test]
    fn digest_is_blake3_hex() {
        let digest = dataset_fingerprint(&make_candles(5));
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn any_field_change_changes_the_digest() {
        let candles = make_candles(20);
        let mut tweaked = candles.clone();
        tweaked[7].close += 0.0001;
        assert_ne!(dataset_fingerprint(&candles), dataset_fingerprint(&tweaked));
    }

    #[test]
    fn order_is_part_of_identity() {
        let candles = make_candles(10);
        let mut swapped = candles.clone();
        swapped.swap(2, 3);
        assert_ne!(dataset_fingerprint(&candles), dataset_fingerprint(&swapped));
    }

    #[test]
    fn indicators_do_not_affect_series_identity() {
        let candles = make_candles(30);
        let bars: Vec<SignalBar> = candles.iter().cloned().map(bare_bar).collect();
        let mut warmed = bars.clone();
        for bar in &mut warmed {
            bar.atr = 2.0;
            bar.rsi = 50.0;
        }
        assert_eq!(series_fingerprint(&bars), series_fingerprint(&warmed));
        assert_eq!(series_fingerprint(&bars), dataset_fingerprint(&candles));
    }

    #[test]
    fn empty_input_still_fingerprints() {
        let digest = dataset_fingerprint(&[]);
        assert_eq!(digest.len(), 64);
    }
}
