//! Domain types for siglab.

pub mod candle;
pub mod series;
pub mod signal_bar;
pub mod trade;

pub use candle::Candle;
pub use series::{validate_bars, validate_candles, SeriesError};
pub use signal_bar::SignalBar;
pub use trade::{ExitReason, TradeRecord, TradeType};

/// Symbol type alias
pub type Symbol = String;
