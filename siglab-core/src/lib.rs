//! siglab core — candle data, indicators, signal scoring, and the scan engine.
//!
//! This crate contains everything below the run orchestration layer:
//! - Domain types (candles, enriched signal bars, trade records)
//! - Indicator computations (EMA, RSI, MACD, Bollinger bands, ATR)
//! - Filter scoring over a fixed 21-bar evaluation window
//! - The scan engine: entry gate, trade simulator, cooldown tracker, recorder
//! - Data acquisition (KuCoin, CSV import, synthetic) with an on-disk cache
//! - Dataset fingerprints for reproducible run identity

pub mod data;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod indicators;
pub mod signals;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything that crosses the parallel batch
    /// boundary in the runner is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::SignalBar>();
        require_sync::<domain::SignalBar>();
        require_send::<domain::TradeRecord>();
        require_sync::<domain::TradeRecord>();

        require_send::<signals::ScoreResult>();
        require_sync::<signals::ScoreResult>();

        require_send::<engine::ScanConfig>();
        require_sync::<engine::ScanConfig>();
        require_send::<engine::ScanOutcome>();
        require_sync::<engine::ScanOutcome>();
        require_send::<engine::TradeOutcome>();
        require_sync::<engine::TradeOutcome>();

        require_send::<data::CandleCache>();
        require_sync::<data::CandleCache>();
        require_send::<data::KuCoinProvider>();
        require_sync::<data::KuCoinProvider>();
        require_send::<data::SyntheticProvider>();
        require_sync::<data::SyntheticProvider>();
    }

    /// Architecture contract: the entry gate sees only the evaluation window.
    ///
    /// `evaluate_entry` takes the window ending at the signal bar plus the
    /// cooldown state. There is no parameter through which forward bars can
    /// reach the gate; look-ahead would require changing this signature.
    #[test]
    fn entry_gate_has_no_forward_window_parameter() {
        fn _check_signature_builds(
            config: &engine::ScanConfig,
            window: &[domain::SignalBar],
            cooldown: &engine::CooldownTracker,
        ) -> engine::GateDecision {
            engine::evaluate_entry(config, 0, window, cooldown)
        }
    }

    /// Architecture contract: the simulator sees only the forward horizon.
    ///
    /// `simulate` takes an accepted candidate and the horizon slice. The
    /// evaluation window is not a parameter, so exit logic cannot re-read
    /// signal-time state beyond what the candidate carries.
    #[test]
    fn simulator_has_no_window_parameter() {
        fn _check_signature_builds(
            candidate: &engine::Candidate,
            horizon: &[domain::SignalBar],
        ) -> engine::TradeOutcome {
            engine::simulate(candidate, horizon)
        }
    }
}
