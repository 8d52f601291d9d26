//! Module `instruments::range_accrual`.
//!
//! Defines the FX range accrual payout contract consumed by the pricing
//! engine.
//!
//! References: Hull (11th ed.) for range accrual market conventions.
//!
//! Key types and purpose: `RangeAccrual` is the immutable payout
//! description; valuation lives in `pricing::range_accrual`.
//!
//! Numerical considerations: bounds are compared directly against simulated
//! FX levels, so they must be quoted in the same units as the spot used for
//! simulation. An `upper_bound <= 0` is not an error, it selects the
//! one-sided accrual test.

use serde::{Deserialize, Serialize};

/// FX range accrual note.
///
/// The note accrues `notional / fixing_dates` for every fixing on which the
/// FX rate stays in range. With `upper_bound > 0` the range is the closed
/// band `[lower_bound, upper_bound]`; any `upper_bound <= 0` encodes a note
/// with no cap, accruing whenever `fx >= lower_bound`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeAccrual {
    /// Amount paid if every fixing accrues.
    pub notional: f64,
    /// Lower edge of the accrual band.
    pub lower_bound: f64,
    /// Upper edge of the accrual band, or `<= 0` for an uncapped note.
    pub upper_bound: f64,
    /// Number of fixing observations the accrual fraction is quoted over.
    pub fixing_dates: usize,
}

impl RangeAccrual {
    pub fn validate(&self) -> Result<(), String> {
        if !self.notional.is_finite() || self.notional <= 0.0 {
            return Err("notional must be finite and > 0".to_string());
        }
        if !self.lower_bound.is_finite() || !self.upper_bound.is_finite() {
            return Err("bounds must be finite".to_string());
        }
        if self.fixing_dates == 0 {
            return Err("fixing_dates must be >= 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_capped_and_uncapped_notes() {
        let capped = RangeAccrual {
            notional: 1_000_000.0,
            lower_bound: 85.0,
            upper_bound: 95.0,
            fixing_dates: 12,
        };
        assert!(capped.validate().is_ok());

        let uncapped = RangeAccrual {
            upper_bound: 0.0,
            ..capped
        };
        assert!(uncapped.validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_fields() {
        let note = RangeAccrual {
            notional: 1_000_000.0,
            lower_bound: 85.0,
            upper_bound: 95.0,
            fixing_dates: 12,
        };

        let zero_notional = RangeAccrual {
            notional: 0.0,
            ..note.clone()
        };
        assert!(zero_notional.validate().is_err());

        let nan_bound = RangeAccrual {
            lower_bound: f64::NAN,
            ..note.clone()
        };
        assert!(nan_bound.validate().is_err());

        let no_fixings = RangeAccrual {
            fixing_dates: 0,
            ..note
        };
        assert!(no_fixings.validate().is_err());
    }
}
