//! Historical market data consumed by calibration and pricing.

pub mod history;

pub use history::{HistoryRow, RateHistory, RateSeries};
