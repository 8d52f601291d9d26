//! CIR parameter estimation from a historical rate series.
//!
//! Ordinary least squares on the normalized Euler regression gives a closed
//! form seed. Maximum likelihood then refines it under either the exact
//! noncentral chi-square transition density or a Gaussian approximation of
//! the one-step conditional distribution.
//!
//! References:
//! - Cox, Ingersoll, Ross (1985), *A Theory of the Term Structure of
//!   Interest Rates*.
//! - Kladivko (2007), maximum likelihood estimation of the CIR process.

use std::f64::consts::PI;

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::calibration::core::ConvergenceInfo;
use crate::calibration::optimizers::{NelderMeadOptions, nelder_mead};
use crate::core::EngineError;
use crate::math::bessel::ln_scaled_bessel_i;
use crate::models::cir::CIR;

/// Transition density used by maximum-likelihood refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Likelihood {
    /// Exact noncentral chi-square density of the CIR transition.
    ExactTransitionDensity,
    /// Gaussian density matched to the Euler step's first two moments.
    GaussianApproximation,
}

/// Fitted model together with the optimizer's diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CirFit {
    /// Refined parameters, carrying the calibration time step.
    pub model: CIR,
    /// Negative log-likelihood at the refined parameters.
    pub objective: f64,
    pub convergence: ConvergenceInfo,
}

/// Closed-form least-squares estimate of CIR parameters.
///
/// Regresses the normalized increments `(r[k+1] - r[k]) / sqrt(|r[k]|)` on
/// `dt / sqrt(|r[k]|)` and `dt * sqrt(|r[k]|)`; the drift parameters fall out
/// of the two regression weights and the volatility out of the residual sum
/// of squares. Observations equal to zero make the regressors undefined and
/// are rejected.
pub fn fit_least_squares(series: &[f64], dt: f64) -> Result<CIR, EngineError> {
    if series.len() < 3 {
        return Err(EngineError::Calibration(format!(
            "least squares requires at least 3 observations, got {}",
            series.len()
        )));
    }
    if !dt.is_finite() || dt <= 0.0 {
        return Err(EngineError::InvalidInput(
            "dt must be finite and > 0".to_string(),
        ));
    }
    if series.iter().any(|r| !r.is_finite()) {
        return Err(EngineError::InvalidInput(
            "rate observations must be finite".to_string(),
        ));
    }
    if let Some(index) = series.iter().position(|r| *r == 0.0) {
        return Err(EngineError::NumericGuard(format!(
            "rate at index {index} is zero and cannot be normalized"
        )));
    }

    let mut rows = Vec::with_capacity(series.len() - 1);
    for pair in series.windows(2) {
        let sqrt_r = pair[0].abs().sqrt();
        let response = (pair[1] - pair[0]) / sqrt_r;
        rows.push((response, dt / sqrt_r, dt * sqrt_r));
    }

    let mut xtx = Matrix2::zeros();
    let mut xty = Vector2::zeros();
    for &(y, x1, x2) in &rows {
        xtx[(0, 0)] += x1 * x1;
        xtx[(0, 1)] += x1 * x2;
        xtx[(1, 1)] += x2 * x2;
        xty[0] += x1 * y;
        xty[1] += x2 * y;
    }
    xtx[(1, 0)] = xtx[(0, 1)];

    // The singularity test is relative to the matrix scale.
    let det: f64 = xtx.determinant();
    if !det.is_finite() || det.abs() <= 1e-12 * xtx[(0, 0)] * xtx[(1, 1)] {
        return Err(EngineError::Calibration(
            "singular design matrix, the series has no usable variation".to_string(),
        ));
    }
    let inverse = Matrix2::new(xtx[(1, 1)], -xtx[(0, 1)], -xtx[(1, 0)], xtx[(0, 0)]) / det;
    let weights = inverse * xty;

    let a = -weights[1];
    let b = weights[0] / a;

    let mut rss = 0.0;
    for &(y, x1, x2) in &rows {
        let residual = y - weights[0] * x1 - weights[1] * x2;
        rss += residual * residual;
    }
    let sigma = (rss / (rows.len() as f64 * dt)).sqrt();

    if !(a.is_finite() && b.is_finite() && sigma.is_finite()) {
        return Err(EngineError::Calibration(
            "least-squares estimate is not finite".to_string(),
        ));
    }
    Ok(CIR { a, b, sigma, dt })
}

/// Refines an initial CIR estimate by minimizing the negative
/// log-likelihood with Nelder-Mead.
///
/// The search is unconstrained; parameter vectors for which the chosen
/// likelihood is undefined evaluate to `+inf` and the simplex retreats from
/// them. The time step is taken from `initial` and is not optimized. Returns
/// a calibration error when the optimizer exhausts its budget without
/// meeting tolerance.
pub fn fit_maximum_likelihood(
    series: &[f64],
    initial: &CIR,
    likelihood: Likelihood,
    options: &NelderMeadOptions,
) -> Result<CirFit, EngineError> {
    if series.len() < 3 {
        return Err(EngineError::Calibration(format!(
            "maximum likelihood requires at least 3 observations, got {}",
            series.len()
        )));
    }
    if series.iter().any(|r| !r.is_finite()) {
        return Err(EngineError::InvalidInput(
            "rate observations must be finite".to_string(),
        ));
    }
    initial.validate()?;

    match likelihood {
        Likelihood::ExactTransitionDensity => {
            if let Some(index) = series.iter().position(|r| *r <= 0.0) {
                return Err(EngineError::Calibration(format!(
                    "exact likelihood requires strictly positive rates, found {} at index {index}",
                    series[index]
                )));
            }
        }
        Likelihood::GaussianApproximation => {
            // The first observation only ever enters as a conditioning
            // value, so it may be nonpositive.
            if let Some(offset) = series[1..].iter().position(|r| *r <= 0.0) {
                return Err(EngineError::Calibration(format!(
                    "gaussian likelihood requires positive rates after the first observation, \
                     found {} at index {}",
                    series[offset + 1],
                    offset + 1
                )));
            }
        }
    }

    let dt = initial.dt;
    let seed = [initial.a, initial.b, initial.sigma];
    let result = nelder_mead(&seed, *options, |x| match likelihood {
        Likelihood::ExactTransitionDensity => {
            exact_negative_log_likelihood(series, x[0], x[1], x[2], dt)
        }
        Likelihood::GaussianApproximation => {
            gaussian_negative_log_likelihood(series, x[0], x[1], x[2], dt)
        }
    })
    .map_err(EngineError::Calibration)?;

    if !result.convergence.converged {
        return Err(EngineError::Calibration(format!(
            "likelihood refinement did not converge within {} iterations",
            result.convergence.iterations
        )));
    }

    Ok(CirFit {
        model: CIR {
            a: result.x[0],
            b: result.x[1],
            sigma: result.x[2],
            dt,
        },
        objective: result.objective,
        convergence: result.convergence,
    })
}

/// Negative log-likelihood under the exact CIR transition density.
///
/// With `c = 2a / (sigma^2 (1 - e^{-a dt}))`, `u = c r_k e^{-a dt}`,
/// `v = c r_{k+1}` and `q = 2ab/sigma^2 - 1`, each transition contributes
/// `ln c - u - v + (q/2) ln(v/u) + ln I_q(2 sqrt(uv))`, evaluated through
/// the scaled Bessel function to survive large arguments.
fn exact_negative_log_likelihood(series: &[f64], a: f64, b: f64, sigma: f64, dt: f64) -> f64 {
    if !(a.is_finite() && b.is_finite() && sigma.is_finite()) || a <= 0.0 || sigma <= 0.0 {
        return f64::INFINITY;
    }
    let decay = (-a * dt).exp();
    let denom = sigma * sigma * (1.0 - decay);
    if !denom.is_finite() || denom <= 0.0 {
        return f64::INFINITY;
    }
    let c = 2.0 * a / denom;
    if !c.is_finite() || c <= 0.0 {
        return f64::INFINITY;
    }
    let q = 2.0 * a * b / (sigma * sigma) - 1.0;
    if !q.is_finite() || q <= -1.0 {
        return f64::INFINITY;
    }

    let mut log_likelihood = (series.len() - 1) as f64 * c.ln();
    for pair in series.windows(2) {
        let u = c * pair[0] * decay;
        let v = c * pair[1];
        let x = 2.0 * (u * v).sqrt();
        let Ok(ln_ive) = ln_scaled_bessel_i(q, x) else {
            return f64::INFINITY;
        };
        log_likelihood += -u - v + 0.5 * q * (v / u).ln() + ln_ive + x;
    }
    if log_likelihood.is_finite() {
        -log_likelihood
    } else {
        f64::INFINITY
    }
}

/// Negative log-likelihood of the Euler step under a Gaussian density with
/// mean `a (b - r_k) dt` and variance `sigma^2 r_{k+1} dt`.
fn gaussian_negative_log_likelihood(series: &[f64], a: f64, b: f64, sigma: f64, dt: f64) -> f64 {
    if !(a.is_finite() && b.is_finite() && sigma.is_finite()) || sigma <= 0.0 {
        return f64::INFINITY;
    }
    let mut nll = 0.0;
    for pair in series.windows(2) {
        let variance = sigma * sigma * pair[1] * dt;
        if !variance.is_finite() || variance <= 0.0 {
            return f64::INFINITY;
        }
        let residual = (pair[1] - pair[0]) - a * (b - pair[0]) * dt;
        nll += 0.5 * ((2.0 * PI * variance).ln() + residual * residual / variance);
    }
    if nll.is_finite() {
        nll
    } else {
        f64::INFINITY
    }
}
