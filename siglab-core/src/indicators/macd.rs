//! Moving Average Convergence Divergence (MACD).
//!
//! macd      = EMA(fast) - EMA(slow) of close
//! signal    = EMA(signal_span) of the macd line
//! histogram = macd - signal
//!
//! All three lines inherit the seed-from-first-value EMA convention, so the
//! series carry no warm-up NaN prefix (lookback 0); early values lean on the
//! seed and converge within a few slow spans.

use super::ema::ema_of_series;
use super::Indicator;
use crate::domain::Candle;

/// Which MACD output line an instance produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal_span: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn line(fast: usize, slow: usize, signal_span: usize) -> Self {
        Self::with_line(fast, slow, signal_span, MacdLine::Macd, "macd")
    }

    pub fn signal(fast: usize, slow: usize, signal_span: usize) -> Self {
        Self::with_line(fast, slow, signal_span, MacdLine::Signal, "macd_signal")
    }

    pub fn histogram(fast: usize, slow: usize, signal_span: usize) -> Self {
        Self::with_line(fast, slow, signal_span, MacdLine::Histogram, "macd_histogram")
    }

    fn with_line(
        fast: usize,
        slow: usize,
        signal_span: usize,
        line: MacdLine,
        prefix: &str,
    ) -> Self {
        assert!(fast >= 1 && slow >= 1 && signal_span >= 1, "MACD spans must be >= 1");
        assert!(fast < slow, "MACD fast span must be shorter than slow span");
        Self {
            fast,
            slow,
            signal_span,
            line,
            name: format!("{prefix}_{fast}_{slow}_{signal_span}"),
        }
    }

    fn compute_lines(&self, candles: &[Candle]) -> (Vec<f64>, Vec<f64>) {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let (macd, signal, _) = macd_lines(&closes, self.fast, self.slow, self.signal_span);
        (macd, signal)
    }
}

/// All three MACD series in one pass: `(macd, signal, histogram)`.
pub fn macd_lines(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_span: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let fast_ema = ema_of_series(closes, fast);
    let slow_ema = ema_of_series(closes, slow);
    let macd: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema_of_series(&macd, signal_span);
    let histogram: Vec<f64> = macd
        .iter()
        .zip(signal.iter())
        .map(|(m, s)| m - s)
        .collect();
    (macd, signal, histogram)
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let (macd, signal) = self.compute_lines(candles);
        match self.line {
            MacdLine::Macd => macd,
            MacdLine::Signal => signal,
            MacdLine::Histogram => macd
                .iter()
                .zip(signal.iter())
                .map(|(m, s)| m - s)
                .collect(),
        }
    }
}
