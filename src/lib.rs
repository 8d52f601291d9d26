//! FX range accrual pricing on a Monte Carlo CIR engine.
//!
//! `fxrange` calibrates a Cox-Ingersoll-Ross short-rate model to each of two
//! historical rate series, simulates both rates and the exchange rate they
//! drive, imposes a historical correlation structure on the simulated paths
//! and prices range accrual notes on the result.
//!
//! References used across modules include:
//! - Cox, Ingersoll, Ross (1985) for the short-rate dynamics.
//! - Kladivko (2007) for CIR maximum-likelihood estimation.
//! - Glasserman (2004) for Monte Carlo estimators.
//! - Hull (11th ed.) for range accrual conventions.
//!
//! Numerical considerations:
//! - Euler simulation takes `sqrt(|r|)` diffusion terms, so paths may go
//!   negative; no truncation is applied and the discretization bias is
//!   documented rather than corrected.
//! - The exact CIR likelihood is evaluated through a log-scaled Bessel
//!   function to survive the large arguments per-period calibration
//!   produces.
//! - Correlation is imposed on evolved paths after simulation, a cheap
//!   approximation of jointly driven dynamics.
//!
//! When to use this crate vs alternatives:
//! - Use `fxrange` when you want the complete history-to-price pipeline for
//!   FX range accruals with auditable intermediate path matrices.
//! - Use a general pricing library if you need discounting, curve
//!   construction or a wider instrument catalogue; this crate deliberately
//!   prices undiscounted expectations only.
//!
//! # Feature Flags
//! - `parallel`: enables Rayon-powered per-step path updates; normal draws
//!   stay sequential so results match the serial build.
//!
//! # Quick Start
//! Calibrate a CIR model to a rate series:
//! ```rust
//! use fxrange::calibration::fit_least_squares;
//!
//! let series = [5.0, 5.1, 4.9, 5.2, 5.0, 4.8, 5.3, 5.0, 4.9, 5.1];
//! let model = fit_least_squares(&series, 0.1).unwrap();
//! assert!(model.a.is_finite() && model.b.is_finite() && model.sigma > 0.0);
//! ```
//!
//! Value a note on existing FX paths:
//! ```rust
//! use fxrange::instruments::RangeAccrual;
//! use fxrange::mc::PathMatrix;
//! use fxrange::pricing::expected_payout;
//!
//! let paths = PathMatrix::from_rows(vec![
//!     vec![90.0, 91.0, 89.5],
//!     vec![90.0, 88.0, 92.0],
//! ])
//! .unwrap();
//! let note = RangeAccrual {
//!     notional: 1_000_000.0,
//!     lower_bound: 89.0,
//!     upper_bound: 0.0,
//!     fixing_dates: 2,
//! };
//! let value = expected_payout(&note, &paths).unwrap();
//! assert!(value > 0.0 && value <= note.notional);
//! ```
//!
//! Price straight from history:
//! ```rust
//! use chrono::NaiveDate;
//! use fxrange::instruments::RangeAccrual;
//! use fxrange::market::{HistoryRow, RateHistory};
//! use fxrange::mc::CorrelationFactor;
//! use fxrange::pricing::price_from_history;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let rows: Vec<HistoryRow> = (0..10u32)
//!     .map(|i| HistoryRow {
//!         date: NaiveDate::from_ymd_opt(2024, 3, 1 + i).unwrap(),
//!         domestic: 3.0 + 0.05 * (i % 3) as f64,
//!         foreign: 5.0 + 0.07 * (i % 4) as f64,
//!         fx: 90.0 + 0.2 * (i % 5) as f64,
//!     })
//!     .collect();
//! let history = RateHistory::from_rows(rows).unwrap();
//!
//! let note = RangeAccrual {
//!     notional: 1_000_000.0,
//!     lower_bound: 85.0,
//!     upper_bound: 95.0,
//!     fixing_dates: 10,
//! };
//! let mut rng = StdRng::seed_from_u64(7);
//! let pricing =
//!     price_from_history(&history, &note, 500, &CorrelationFactor::identity(), &mut rng)
//!         .unwrap();
//! assert!(pricing.fair_value >= 0.0 && pricing.fair_value <= note.notional);
//! ```

pub mod calibration;
pub mod core;
pub mod instruments;
pub mod market;
pub mod math;
pub mod mc;
pub mod models;
pub mod pricing;

/// Common imports for ergonomic usage.
#[allow(ambiguous_glob_reexports)]
pub mod prelude {
    pub use crate::calibration::*;
    pub use crate::core::*;
    pub use crate::instruments::*;
    pub use crate::market::*;
    pub use crate::mc::*;
    pub use crate::models::*;
    pub use crate::pricing::*;
}
