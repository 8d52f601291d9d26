//! Instrument definitions.

pub mod range_accrual;

pub use range_accrual::RangeAccrual;
