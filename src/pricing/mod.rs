pub mod range_accrual;

pub use range_accrual::{
    DEFAULT_FX_VOLATILITY, RangeAccrualPricing, expected_payout, price_from_history,
};
