//! Numerical building blocks shared by calibration and simulation.

pub mod bessel;
pub mod correlation;

pub use bessel::ln_scaled_bessel_i;
pub use correlation::{cholesky_lower, sample_correlation_matrix};

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn sample_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard error of the sample mean, using the population variance.
pub fn standard_error(values: &[f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let mean = sample_mean(values);
    let sum_sq: f64 = values.iter().map(|v| v * v).sum();
    let variance = (sum_sq / n as f64 - mean * mean).max(0.0);
    (variance / n as f64).sqrt()
}
