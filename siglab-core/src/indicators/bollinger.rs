//! Bollinger Bands.
//!
//! middle = SMA(period) of close
//! upper  = middle + multiplier * stddev(close, period)
//! lower  = middle - multiplier * stddev(close, period)
//!
//! Standard deviation is the sample form (n - 1 divisor).
//! Lookback: period - 1.

use super::Indicator;
use crate::domain::Candle;

/// Which band an instance produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Upper, "bb_upper")
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Middle, "bb_middle")
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Lower, "bb_lower")
    }

    fn with_band(period: usize, multiplier: f64, band: BollingerBand, prefix: &str) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        assert!(multiplier > 0.0, "Bollinger multiplier must be > 0");
        Self {
            period,
            multiplier,
            band,
            name: format!("{prefix}_{period}"),
        }
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let n = candles.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &candles[i + 1 - self.period..=i];
            if window.iter().any(|c| c.close.is_nan()) {
                continue; // window straddles a NaN close, leave NaN
            }

            let mean: f64 =
                window.iter().map(|c| c.close).sum::<f64>() / self.period as f64;

            result[i] = match self.band {
                BollingerBand::Middle => mean,
                BollingerBand::Upper | BollingerBand::Lower => {
                    let variance = window
                        .iter()
                        .map(|c| (c.close - mean).powi(2))
                        .sum::<f64>()
                        / (self.period - 1) as f64;
                    let std = variance.sqrt();
                    match self.band {
                        BollingerBand::Upper => mean + self.multiplier * std,
                        BollingerBand::Lower => mean - self.multiplier * std,
                        BollingerBand::Middle => unreachable!(),
                    }
                }
            };
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn bollinger_middle_is_sma() {
        let candles = make_candles(&[10.0, 20.0, 30.0, 40.0]);
        let result = Bollinger::middle(3, 2.0).compute(&candles);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 20.0, DEFAULT_EPSILON);
        assert_approx(result[3], 30.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_bands_symmetric_around_middle() {
        let closes: Vec<f64> = (0..30)
            .map(|i| 100.0 + (i as f64 * 0.9).sin() * 3.0)
            .collect();
        let candles = make_candles(&closes);
        let upper = Bollinger::upper(20, 2.0).compute(&candles);
        let middle = Bollinger::middle(20, 2.0).compute(&candles);
        let lower = Bollinger::lower(20, 2.0).compute(&candles);
        for i in 19..30 {
            assert_approx(
                upper[i] - middle[i],
                middle[i] - lower[i],
                DEFAULT_EPSILON,
            );
            assert!(upper[i] >= lower[i]);
        }
    }

    #[test]
    fn bollinger_known_sample_std() {
        // Closes 10, 20, 30: mean 20, sample variance ((100+0+100)/2) = 100,
        // std 10. With multiplier 2: upper 40, lower 0.
        let candles = make_candles(&[10.0, 20.0, 30.0]);
        let upper = Bollinger::upper(3, 2.0).compute(&candles);
        let lower = Bollinger::lower(3, 2.0).compute(&candles);
        assert_approx(upper[2], 40.0, DEFAULT_EPSILON);
        assert_approx(lower[2], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_constant_price_zero_width() {
        let candles = make_candles(&[50.0; 25]);
        let upper = Bollinger::upper(20, 2.0).compute(&candles);
        let lower = Bollinger::lower(20, 2.0).compute(&candles);
        assert_approx(upper[24], 50.0, DEFAULT_EPSILON);
        assert_approx(lower[24], 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_nan_window_stays_nan() {
        let mut candles = make_candles(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        candles[2].close = f64::NAN;
        let result = Bollinger::middle(3, 2.0).compute(&candles);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
    }

    #[test]
    fn bollinger_lookback() {
        assert_eq!(Bollinger::upper(20, 2.0).lookback(), 19);
    }
}
