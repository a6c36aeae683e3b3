//! Relative Strength Index (RSI).
//!
//! Plain rolling-mean variant: average gain and average loss are simple means
//! over the trailing `period` deltas (no Wilder smoothing).
//!
//! RS = avg_gain / avg_loss, RSI = 100 - 100 / (1 + RS).
//! All-loss windows pin to 0, all-gain windows to 100. A window with zero
//! gains and zero losses (flat closes) has no defined RS and yields NaN.
//! Lookback: period (the first delta only exists at index 1).

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let n = candles.len();
        let mut result = vec![f64::NAN; n];

        if n <= self.period {
            return result;
        }

        // Deltas: delta[i] = close[i] - close[i-1]; undefined at index 0.
        let mut gains = vec![f64::NAN; n];
        let mut losses = vec![f64::NAN; n];
        for i in 1..n {
            let delta = candles[i].close - candles[i - 1].close;
            gains[i] = delta.max(0.0);
            losses[i] = (-delta).max(0.0);
        }

        for i in self.period..n {
            let window = (i + 1 - self.period)..=i;
            let mut gain_sum = 0.0;
            let mut loss_sum = 0.0;
            let mut tainted = false;
            for j in window {
                if gains[j].is_nan() || losses[j].is_nan() {
                    tainted = true;
                    break;
                }
                gain_sum += gains[j];
                loss_sum += losses[j];
            }
            if tainted {
                continue; // window straddles a NaN delta, leave NaN
            }
            let avg_gain = gain_sum / self.period as f64;
            let avg_loss = loss_sum / self.period as f64;
            result[i] = compute_rsi(avg_gain, avg_loss);
        }

        result
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain == 0.0 && avg_loss == 0.0 {
        return f64::NAN;
    }
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
