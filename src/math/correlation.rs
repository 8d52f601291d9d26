//! Correlation-matrix utilities for multi-factor Monte Carlo.
//!
//! References:
//! - Glasserman, P. (2004), *Monte Carlo Methods in Financial Engineering*.
//!
//! Centralizes correlation handling for the path generators: estimation from
//! historical series plus the Cholesky factorization applied to simulated
//! draws.

use crate::math::sample_mean;

/// Validates that `corr_matrix` is a finite, symmetric `n x n` correlation
/// matrix with unit diagonal and entries in `[-1, 1]`.
pub fn validate_correlation_matrix(corr_matrix: &[Vec<f64>], n: usize) -> Result<(), String> {
    if corr_matrix.len() != n || corr_matrix.iter().any(|row| row.len() != n) {
        return Err("correlation matrix dimensions must match factor count".to_string());
    }

    for (i, row_i) in corr_matrix.iter().enumerate() {
        let di = row_i[i];
        if !di.is_finite() || (di - 1.0).abs() > 1.0e-10 {
            return Err("correlation matrix diagonal must be 1".to_string());
        }
        for (j, rho) in row_i.iter().copied().enumerate() {
            if !rho.is_finite() || !(-1.0..=1.0).contains(&rho) {
                return Err("correlation entries must be finite and in [-1, 1]".to_string());
            }
            if (rho - corr_matrix[j][i]).abs() > 1.0e-10 {
                return Err("correlation matrix must be symmetric".to_string());
            }
        }
    }

    Ok(())
}

/// Pearson correlation matrix of equal-length series.
///
/// Each element of `series` is one variable observed over the same dates.
/// Uses population covariances; a zero-variance series is rejected because
/// its correlations are undefined.
pub fn sample_correlation_matrix(series: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, String> {
    let k = series.len();
    if k == 0 {
        return Err("correlation estimation requires at least one series".to_string());
    }
    let n = series[0].len();
    if n < 2 {
        return Err("correlation estimation requires at least two observations".to_string());
    }
    if series.iter().any(|s| s.len() != n) {
        return Err("all series must have the same length".to_string());
    }
    if series.iter().flatten().any(|v| !v.is_finite()) {
        return Err("series observations must be finite".to_string());
    }

    let means: Vec<f64> = series.iter().map(|s| sample_mean(s)).collect();

    let mut cov = vec![vec![0.0_f64; k]; k];
    for i in 0..k {
        for j in i..k {
            let c = series[i]
                .iter()
                .zip(series[j].iter())
                .map(|(a, b)| (a - means[i]) * (b - means[j]))
                .sum::<f64>()
                / n as f64;
            cov[i][j] = c;
            cov[j][i] = c;
        }
    }

    for (i, row) in cov.iter().enumerate() {
        if row[i] <= 0.0 {
            return Err(format!("series {i} has zero variance"));
        }
    }

    let mut corr = vec![vec![0.0_f64; k]; k];
    for i in 0..k {
        corr[i][i] = 1.0;
        for j in (i + 1)..k {
            let rho = (cov[i][j] / (cov[i][i].sqrt() * cov[j][j].sqrt())).clamp(-1.0, 1.0);
            corr[i][j] = rho;
            corr[j][i] = rho;
        }
    }

    Ok(corr)
}

/// Cholesky decomposition for symmetric positive semidefinite matrices.
///
/// Returns lower-triangular `L` such that `L L^T ~= matrix`. Semidefinite
/// inputs (a pinned `rho = 1` pair, say) are handled by flooring the
/// diagonal at `tol` instead of failing.
pub fn cholesky_lower(matrix: &[Vec<f64>], tol: f64) -> Option<Vec<Vec<f64>>> {
    let n = matrix.len();
    if n == 0 || matrix.iter().any(|row| row.len() != n) {
        return None;
    }

    let mut l = vec![vec![0.0_f64; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = matrix[i][j];
            for (&lik, &ljk) in l[i].iter().zip(l[j].iter()).take(j) {
                sum -= lik * ljk;
            }

            if i == j {
                if sum < -tol {
                    return None;
                }
                l[i][j] = sum.max(tol).sqrt();
            } else if l[j][j] > tol {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Some(l)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cholesky_of_identity_is_identity() {
        let eye = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ];
        let l = cholesky_lower(&eye, 1.0e-12).expect("identity is PSD");
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(l[i][j], expected, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn cholesky_factor_reconstructs_matrix() {
        let corr = vec![
            vec![1.0, 0.5, 0.3],
            vec![0.5, 1.0, -0.2],
            vec![0.3, -0.2, 1.0],
        ];
        let l = cholesky_lower(&corr, 1.0e-12).expect("valid correlation matrix");

        for i in 0..3 {
            for j in 0..3 {
                let recon: f64 = (0..3).map(|k| l[i][k] * l[j][k]).sum();
                assert_relative_eq!(recon, corr[i][j], epsilon = 1e-10);
            }
        }
        // Lower triangular: nothing above the diagonal.
        assert_eq!(l[0][1], 0.0);
        assert_eq!(l[0][2], 0.0);
        assert_eq!(l[1][2], 0.0);
    }

    #[test]
    fn cholesky_rejects_indefinite_matrix() {
        let indefinite = vec![vec![1.0, 2.0], vec![2.0, 1.0]];
        assert!(cholesky_lower(&indefinite, 1.0e-12).is_none());

        let ragged = vec![vec![1.0, 0.0], vec![0.0]];
        assert!(cholesky_lower(&ragged, 1.0e-12).is_none());
    }

    #[test]
    fn perfectly_correlated_series_estimate_to_unit_rho() {
        let base: Vec<f64> = (0..20).map(|i| (i as f64 * 0.7).sin()).collect();
        let scaled: Vec<f64> = base.iter().map(|v| 3.0 * v + 1.0).collect();
        let negated: Vec<f64> = base.iter().map(|v| -v).collect();

        let corr =
            sample_correlation_matrix(&[base, scaled, negated]).expect("valid input series");
        assert_relative_eq!(corr[0][1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(corr[0][2], -1.0, epsilon = 1e-12);
        validate_correlation_matrix(&corr, 3).expect("estimate is a correlation matrix");
    }

    #[test]
    fn rejects_degenerate_estimation_input() {
        let flat = vec![vec![1.0, 1.0, 1.0], vec![0.1, 0.2, 0.3]];
        assert!(sample_correlation_matrix(&flat).is_err());

        let ragged = vec![vec![1.0, 2.0], vec![1.0, 2.0, 3.0]];
        assert!(sample_correlation_matrix(&ragged).is_err());

        let short = vec![vec![1.0]];
        assert!(sample_correlation_matrix(&short).is_err());
    }

    #[test]
    fn validation_rejects_malformed_matrices() {
        let asymmetric = vec![vec![1.0, 0.4], vec![0.1, 1.0]];
        assert!(validate_correlation_matrix(&asymmetric, 2).is_err());

        let bad_diag = vec![vec![0.9, 0.0], vec![0.0, 1.0]];
        assert!(validate_correlation_matrix(&bad_diag, 2).is_err());

        let out_of_range = vec![vec![1.0, 1.5], vec![1.5, 1.0]];
        assert!(validate_correlation_matrix(&out_of_range, 2).is_err());
    }
}
