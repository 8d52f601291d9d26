use std::fmt::Debug;

use chrono::NaiveDate;
use fxrange::calibration::{
    CirFit, ConvergenceInfo, Likelihood, NelderMeadOptions, TerminationReason, fit_least_squares,
};
use fxrange::instruments::RangeAccrual;
use fxrange::market::{HistoryRow, RateHistory};
use fxrange::mc::CorrelationFactor;
use fxrange::models::CIR;
use fxrange::pricing::price_from_history;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use serde::de::DeserializeOwned;

const REFERENCE_RATES: [f64; 10] = [
    0.05, 0.051, 0.049, 0.052, 0.05, 0.048, 0.053, 0.05, 0.049, 0.051,
];

fn reference_history() -> RateHistory {
    // The reference rate series drives both rate columns.
    let fx = [
        90.0, 90.4, 89.7, 90.9, 90.2, 89.5, 91.0, 90.3, 89.9, 90.5,
    ];
    let rows = (0..REFERENCE_RATES.len())
        .map(|i| HistoryRow {
            date: NaiveDate::from_ymd_opt(2024, 6, 1 + i as u32).unwrap(),
            domestic: REFERENCE_RATES[i],
            foreign: REFERENCE_RATES[i],
            fx: fx[i],
        })
        .collect();
    RateHistory::from_rows(rows).unwrap()
}

#[test]
fn reference_series_calibrates_and_simulates_clean() {
    let model = fit_least_squares(&REFERENCE_RATES, 1.0).unwrap();
    assert!(model.a.is_finite());
    assert!(model.b.is_finite());
    assert!(model.sigma.is_finite());
    assert!(model.sigma > 0.0);

    let mut rng = StdRng::seed_from_u64(3);
    let result = model.simulate(0.05, 1000, 10, &mut rng).unwrap();
    assert_eq!(result.paths.paths(), 1000);
    assert_eq!(result.paths.points(), 11);
    for p in 0..result.paths.paths() {
        assert!(result.paths.path(p).iter().all(|v| v.is_finite()));
        assert_eq!(result.paths.value(p, 0), 0.05);
    }
    assert!(result.terminal_std_error > 0.0);
}

#[test]
fn standard_error_shrinks_with_the_path_count() {
    let model = fit_least_squares(&REFERENCE_RATES, 1.0).unwrap();

    let mut rng = StdRng::seed_from_u64(5);
    let small = model.simulate(0.05, 1000, 10, &mut rng).unwrap();
    let mut rng = StdRng::seed_from_u64(6);
    let large = model.simulate(0.05, 100_000, 10, &mut rng).unwrap();

    // 100x the paths should shave the standard error by about 10x.
    let ratio = small.terminal_std_error / large.terminal_std_error;
    assert!(ratio > 5.0 && ratio < 20.0, "ratio was {ratio}");
}

#[test]
fn pipeline_is_deterministic_for_a_fixed_seed() {
    let history = reference_history();
    let note = RangeAccrual {
        notional: 100.0,
        lower_bound: 89.0,
        upper_bound: 92.0,
        fixing_dates: 10,
    };
    let factor = CorrelationFactor::identity();

    let mut rng = StdRng::seed_from_u64(42);
    let first = price_from_history(&history, &note, 300, &factor, &mut rng).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let second = price_from_history(&history, &note, 300, &factor, &mut rng).unwrap();

    assert_eq!(first.fair_value, second.fair_value);
    for p in [0, 7, 299] {
        for k in 0..first.fx_paths.points() {
            assert_eq!(first.fx_paths.value(p, k), second.fx_paths.value(p, k));
            assert_eq!(
                first.foreign_paths.value(p, k),
                second.foreign_paths.value(p, k)
            );
            assert_eq!(
                first.domestic_paths.value(p, k),
                second.domestic_paths.value(p, k)
            );
        }
    }
}

#[test]
fn pipeline_prices_with_a_history_estimated_factor() {
    let history = reference_history();
    let factor = CorrelationFactor::from_history(&history).unwrap();
    let note = RangeAccrual {
        notional: 100.0,
        lower_bound: 80.0,
        upper_bound: 100.0,
        fixing_dates: 10,
    };

    let mut rng = StdRng::seed_from_u64(9);
    let pricing = price_from_history(&history, &note, 1000, &factor, &mut rng).unwrap();

    assert_eq!(pricing.fx_paths.paths(), 1000);
    assert_eq!(pricing.fx_paths.points(), 11);
    assert_eq!(pricing.foreign_paths.points(), 11);
    assert_eq!(pricing.domestic_paths.points(), 11);
    for p in 0..pricing.fx_paths.paths() {
        assert!(pricing.fx_paths.path(p).iter().all(|v| v.is_finite()));
        assert!(pricing.foreign_paths.path(p).iter().all(|v| v.is_finite()));
        assert!(pricing.domestic_paths.path(p).iter().all(|v| v.is_finite()));
    }
    assert!(pricing.fair_value.is_finite());
    assert!((0.0..=100.0).contains(&pricing.fair_value));
}

fn assert_roundtrip<T>(value: &T)
where
    T: Serialize + DeserializeOwned + PartialEq + Debug,
{
    let json = serde_json::to_string(value).expect("json serialize");
    let back: T = serde_json::from_str(&json).expect("json deserialize");
    assert_eq!(back, *value, "json roundtrip mismatch");
}

#[test]
fn configuration_types_roundtrip_through_json() {
    assert_roundtrip(&CIR {
        a: 0.7,
        b: 4.5,
        sigma: 0.25,
        dt: 0.1,
    });
    assert_roundtrip(&Likelihood::ExactTransitionDensity);
    assert_roundtrip(&Likelihood::GaussianApproximation);
    assert_roundtrip(&NelderMeadOptions::default());
    assert_roundtrip(&RangeAccrual {
        notional: 1_000_000.0,
        lower_bound: 85.0,
        upper_bound: 0.0,
        fixing_dates: 12,
    });
    assert_roundtrip(&CorrelationFactor::identity());
    assert_roundtrip(&HistoryRow {
        date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        domestic: 3.0,
        foreign: 5.1,
        fx: 90.4,
    });
    assert_roundtrip(&CirFit {
        model: CIR {
            a: 0.7,
            b: 4.5,
            sigma: 0.25,
            dt: 0.1,
        },
        objective: -12.5,
        convergence: ConvergenceInfo {
            iterations: 57,
            objective_evaluations: 101,
            converged: true,
            reason: TerminationReason::ObjectiveTolerance,
        },
    });
}
