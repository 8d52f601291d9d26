//! Module `pricing::range_accrual`.
//!
//! Implements Monte Carlo valuation of FX range accrual notes: an expected
//! payout over pre-built FX paths, and the full history-to-price pipeline
//! that calibrates, simulates, correlates and prices in one call.
//!
//! References: Hull (11th ed.) on range accrual conventions; Glasserman,
//! *Monte Carlo Methods in Financial Engineering* (2004) for the sample
//! mean estimator.
//!
//! Key types and purpose: `RangeAccrualPricing` bundles the three
//! correlated path matrices with the fair value so callers can audit the
//! simulation behind a price.
//!
//! Numerical considerations: the fair value is an undiscounted expectation
//! under the simulated measure. The accrual share divides by the note's
//! configured `fixing_dates`, which the caller must keep consistent with
//! the number of non-initial path columns; a mismatch skews the share
//! silently.
//!
//! When to use: `expected_payout` when FX paths already exist,
//! `price_from_history` to go from raw rate and FX history to a price.

use rand::Rng;

use crate::calibration::fit_least_squares;
use crate::core::EngineError;
use crate::instruments::RangeAccrual;
use crate::market::RateHistory;
use crate::mc::{CorrelationFactor, PathMatrix, impose_correlation};
use crate::models::simulate_fx;

/// Per-step FX volatility used by the history pipeline.
pub const DEFAULT_FX_VOLATILITY: f64 = 0.05;

/// Output of `price_from_history`.
#[derive(Debug, Clone)]
pub struct RangeAccrualPricing {
    /// Correlated foreign-rate paths.
    pub foreign_paths: PathMatrix,
    /// Correlated domestic-rate paths.
    pub domestic_paths: PathMatrix,
    /// Correlated FX paths the fair value was priced on.
    pub fx_paths: PathMatrix,
    /// Undiscounted expected payout of the note.
    pub fair_value: f64,
}

fn accrues(note: &RangeAccrual, fx: f64) -> bool {
    if note.upper_bound > 0.0 {
        fx >= note.lower_bound && fx <= note.upper_bound
    } else {
        fx >= note.lower_bound
    }
}

/// Undiscounted expected payout of `note` over a set of FX paths.
///
/// Column 0 is the spot and never accrues. Each path contributes
/// `notional * hits / fixing_dates`; the fair value is the equally weighted
/// mean of the per-path payouts.
pub fn expected_payout(note: &RangeAccrual, fx_paths: &PathMatrix) -> Result<f64, EngineError> {
    note.validate().map_err(EngineError::InvalidInput)?;
    if fx_paths.steps() == 0 {
        return Err(EngineError::InvalidInput(
            "fx paths need at least one fixing column".to_string(),
        ));
    }

    let fixing_count = note.fixing_dates as f64;
    let mut sum_payout = 0.0;
    for p in 0..fx_paths.paths() {
        let hits = fx_paths.path(p)[1..]
            .iter()
            .filter(|&&fx| accrues(note, fx))
            .count();
        sum_payout += note.notional * hits as f64 / fixing_count;
    }
    Ok(sum_payout / fx_paths.paths() as f64)
}

/// Prices a range accrual note straight from rate and FX history.
///
/// The most recent history row provides the starting rates and FX spot.
/// Both rate columns are calibrated by least squares with
/// `dt = 1 / fixing_dates`, simulated for `fixing_dates` steps, combined
/// into FX paths with the engine's fixed FX volatility, correlated with
/// `factor` and finally priced. The returned matrices are the correlated
/// path sets the fair value was computed on.
pub fn price_from_history<R: Rng>(
    history: &RateHistory,
    note: &RangeAccrual,
    n_simulations: usize,
    factor: &CorrelationFactor,
    rng: &mut R,
) -> Result<RangeAccrualPricing, EngineError> {
    note.validate().map_err(EngineError::InvalidInput)?;

    let start = history.latest();
    let n_steps = note.fixing_dates;
    let dt = 1.0 / n_steps as f64;

    let foreign_model = fit_least_squares(history.foreign(), dt)?;
    let domestic_model = fit_least_squares(history.domestic(), dt)?;

    let foreign = foreign_model.simulate(start.foreign, n_simulations, n_steps, rng)?;
    let domestic = domestic_model.simulate(start.domestic, n_simulations, n_steps, rng)?;

    let fx = simulate_fx(
        start.fx,
        DEFAULT_FX_VOLATILITY,
        &domestic.paths,
        &foreign.paths,
        n_steps,
        rng,
    )?;

    let correlated = impose_correlation(factor, &foreign.paths, &domestic.paths, &fx)?;
    let fair_value = expected_payout(note, &correlated.fx)?;

    Ok(RangeAccrualPricing {
        foreign_paths: correlated.foreign,
        domestic_paths: correlated.domestic,
        fx_paths: correlated.fx,
        fair_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::HistoryRow;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn note(lower: f64, upper: f64, fixings: usize) -> RangeAccrual {
        RangeAccrual {
            notional: 100.0,
            lower_bound: lower,
            upper_bound: upper,
            fixing_dates: fixings,
        }
    }

    fn fx_matrix() -> PathMatrix {
        PathMatrix::from_rows(vec![vec![90.0, 91.0, 96.0], vec![90.0, 85.0, 92.0]]).unwrap()
    }

    #[test]
    fn full_band_pays_the_notional_exactly() {
        let paths = fx_matrix();

        let uncapped = note(-1.0e9, 0.0, 2);
        assert_eq!(expected_payout(&uncapped, &paths).unwrap(), 100.0);

        let wide = note(1.0, 1_000.0, 2);
        assert_eq!(expected_payout(&wide, &paths).unwrap(), 100.0);
    }

    #[test]
    fn unreachable_band_pays_zero_exactly() {
        let paths = fx_matrix();
        let above_everything = note(1_000.0, 2_000.0, 2);
        assert_eq!(expected_payout(&above_everything, &paths).unwrap(), 0.0);
    }

    #[test]
    fn partial_accrual_counts_fixings_per_path() {
        let paths = fx_matrix();

        // Band [90, 95]: one hit on each path out of two fixings.
        let banded = note(90.0, 95.0, 2);
        assert_eq!(expected_payout(&banded, &paths).unwrap(), 50.0);

        // Uncapped at 90: path 0 accrues twice, path 1 once.
        let floored = note(90.0, 0.0, 2);
        assert_eq!(expected_payout(&floored, &paths).unwrap(), 75.0);
    }

    #[test]
    fn spot_column_never_accrues() {
        // Only the spot sits in range, so nothing accrues.
        let paths = PathMatrix::from_rows(vec![vec![90.0, 200.0, 200.0]]).unwrap();
        let banded = note(89.0, 91.0, 2);
        assert_eq!(expected_payout(&banded, &paths).unwrap(), 0.0);
    }

    #[test]
    fn rejects_invalid_notes_and_missing_fixings() {
        let paths = fx_matrix();

        let bad_note = note(90.0, 95.0, 0);
        assert!(matches!(
            expected_payout(&bad_note, &paths),
            Err(EngineError::InvalidInput(_))
        ));

        let spot_only = PathMatrix::from_rows(vec![vec![90.0]]).unwrap();
        assert!(matches!(
            expected_payout(&note(90.0, 95.0, 2), &spot_only),
            Err(EngineError::InvalidInput(_))
        ));
    }

    fn history() -> RateHistory {
        let domestic = [3.0, 3.05, 2.95, 3.1, 3.0, 2.9, 3.08, 3.0, 2.97, 3.02];
        let foreign = [5.0, 5.1, 4.9, 5.2, 5.0, 4.8, 5.3, 5.0, 4.9, 5.1];
        let fx = [90.0, 90.4, 89.7, 90.9, 90.2, 89.5, 91.0, 90.3, 89.9, 90.5];
        let rows = (0..10)
            .map(|i| HistoryRow {
                date: NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).unwrap(),
                domestic: domestic[i],
                foreign: foreign[i],
                fx: fx[i],
            })
            .collect();
        RateHistory::from_rows(rows).unwrap()
    }

    #[test]
    fn history_pipeline_prices_within_payout_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let pricing = price_from_history(
            &history(),
            &note(80.0, 100.0, 10),
            200,
            &CorrelationFactor::identity(),
            &mut rng,
        )
        .unwrap();

        assert_eq!(pricing.fx_paths.paths(), 200);
        assert_eq!(pricing.fx_paths.points(), 11);
        assert_eq!(pricing.foreign_paths.points(), 11);
        assert_eq!(pricing.domestic_paths.points(), 11);

        for p in 0..pricing.fx_paths.paths() {
            assert_eq!(pricing.fx_paths.value(p, 0), 90.5);
            assert!(pricing.fx_paths.path(p).iter().all(|v| v.is_finite()));
        }
        assert!(pricing.fair_value.is_finite());
        assert!((0.0..=100.0).contains(&pricing.fair_value));
    }

    #[test]
    fn history_pipeline_validates_the_note_first() {
        let mut rng = StdRng::seed_from_u64(11);
        let err = price_from_history(
            &history(),
            &note(80.0, 100.0, 0),
            200,
            &CorrelationFactor::identity(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
