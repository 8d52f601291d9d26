//! FX path simulation driven by simulated rate differentials.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::core::EngineError;
use crate::mc::paths::PathMatrix;

/// Simulates FX paths from already-simulated rate paths.
///
/// With local step `dt = 1 / n_steps` and percent-quoted rates:
///
/// ```text
/// fx_{k+1} = fx_k * (1 + (foreign_k - domestic_k) / 100 * dt + sigma * Z)
/// ```
///
/// The rate at the start of each step drives that step. The noise term is a
/// plain `sigma * Z` without `sqrt(dt)` scaling, so `sigma` is a per-step
/// volatility rather than an annualized one.
pub fn simulate_fx<R: Rng>(
    fx0: f64,
    sigma: f64,
    domestic: &PathMatrix,
    foreign: &PathMatrix,
    n_steps: usize,
    rng: &mut R,
) -> Result<PathMatrix, EngineError> {
    if !fx0.is_finite() || fx0 <= 0.0 {
        return Err(EngineError::InvalidInput(
            "fx0 must be finite and > 0".to_string(),
        ));
    }
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(EngineError::InvalidInput(
            "sigma must be finite and >= 0".to_string(),
        ));
    }
    if n_steps == 0 {
        return Err(EngineError::InvalidInput(
            "n_steps must be >= 1".to_string(),
        ));
    }
    if domestic.paths() != foreign.paths() || domestic.points() != foreign.points() {
        return Err(EngineError::ShapeMismatch(format!(
            "domestic {}x{} vs foreign {}x{}",
            domestic.paths(),
            domestic.points(),
            foreign.paths(),
            foreign.points()
        )));
    }
    if domestic.points() < n_steps {
        return Err(EngineError::ShapeMismatch(format!(
            "rate paths have {} points but {n_steps} steps are driven",
            domestic.points()
        )));
    }

    let n_paths = domestic.paths();
    let dt = 1.0 / n_steps as f64;
    let drift_scale = dt / 100.0;

    let mut fx = PathMatrix::with_start(fx0, n_paths, n_steps + 1);
    let mut zs = vec![0.0_f64; n_paths];

    for k in 0..n_steps {
        for z in zs.iter_mut() {
            *z = StandardNormal.sample(rng);
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            fx.par_rows_mut()
                .enumerate()
                .zip(zs.par_iter())
                .for_each(|((p, row), &z)| {
                    let differential = foreign.value(p, k) - domestic.value(p, k);
                    row[k + 1] = row[k] * (1.0 + differential * drift_scale + sigma * z);
                });
        }
        #[cfg(not(feature = "parallel"))]
        for ((p, row), &z) in fx.rows_mut().enumerate().zip(zs.iter()) {
            let differential = foreign.value(p, k) - domestic.value(p, k);
            row[k + 1] = row[k] * (1.0 + differential * drift_scale + sigma * z);
        }
    }

    Ok(fx)
}
