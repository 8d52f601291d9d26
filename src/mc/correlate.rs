//! Post-hoc correlation of simulated path sets.
//!
//! The engine correlates already-built paths rather than the driving noises:
//! for every `(path, time)` cell the `(foreign, domestic, fx)` triple is
//! left-multiplied by a lower-triangular factor. Each transform is local to
//! its cell triple, so values never mix across simulations or time points.

use serde::{Deserialize, Serialize};

use crate::core::EngineError;
use crate::market::RateHistory;
use crate::math::correlation::{
    cholesky_lower, sample_correlation_matrix, validate_correlation_matrix,
};
use crate::mc::paths::PathMatrix;

const CHOLESKY_TOL: f64 = 1.0e-12;

/// Lower-triangular factor over the variable order `(foreign, domestic, fx)`.
///
/// Treated as an opaque read-only input: no attempt is made to verify that
/// the factor came from a positive semidefinite matrix. The dedicated
/// constructors do factor well-formed inputs, but a caller-supplied factor
/// is applied as given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationFactor {
    rows: [[f64; 3]; 3],
}

impl CorrelationFactor {
    /// The identity factor, which leaves paths unchanged.
    pub fn identity() -> Self {
        Self {
            rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Builds a factor from explicit rows.
    ///
    /// Entries must be finite and the strict upper triangle zero.
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Result<Self, EngineError> {
        if rows.iter().flatten().any(|v| !v.is_finite()) {
            return Err(EngineError::InvalidInput(
                "factor entries must be finite".to_string(),
            ));
        }
        if rows[0][1] != 0.0 || rows[0][2] != 0.0 || rows[1][2] != 0.0 {
            return Err(EngineError::InvalidInput(
                "factor must be lower triangular".to_string(),
            ));
        }
        Ok(Self { rows })
    }

    /// Factors a full `(foreign, domestic, fx)` correlation matrix.
    pub fn from_correlation(corr: &[[f64; 3]; 3]) -> Result<Self, EngineError> {
        let full: Vec<Vec<f64>> = corr.iter().map(|row| row.to_vec()).collect();
        validate_correlation_matrix(&full, 3).map_err(EngineError::InvalidInput)?;
        let chol = cholesky_lower(&full, CHOLESKY_TOL).ok_or_else(|| {
            EngineError::InvalidInput(
                "correlation matrix is not positive semidefinite".to_string(),
            )
        })?;
        Ok(Self::from_chol(&chol))
    }

    /// Estimates the factor from historical data.
    ///
    /// Uses one-step changes of the two rate columns and log-returns of the
    /// FX column, in the engine's `(foreign, domestic, fx)` order.
    pub fn from_history(history: &RateHistory) -> Result<Self, EngineError> {
        if history.len() < 3 {
            return Err(EngineError::InvalidInput(
                "correlation estimation requires at least 3 history rows".to_string(),
            ));
        }
        if history.fx().iter().any(|v| *v <= 0.0) {
            return Err(EngineError::InvalidInput(
                "fx quotes must be > 0 to take log-returns".to_string(),
            ));
        }

        let foreign_changes = one_step_changes(history.foreign());
        let domestic_changes = one_step_changes(history.domestic());
        let fx_log_returns: Vec<f64> = history
            .fx()
            .windows(2)
            .map(|w| (w[1] / w[0]).ln())
            .collect();

        let corr = sample_correlation_matrix(&[foreign_changes, domestic_changes, fx_log_returns])
            .map_err(EngineError::Calibration)?;
        let chol = cholesky_lower(&corr, CHOLESKY_TOL).ok_or_else(|| {
            EngineError::Calibration(
                "estimated correlation matrix could not be factored".to_string(),
            )
        })?;
        Ok(Self::from_chol(&chol))
    }

    /// The factor rows, lower triangle populated.
    #[inline]
    pub fn rows(&self) -> &[[f64; 3]; 3] {
        &self.rows
    }

    fn from_chol(chol: &[Vec<f64>]) -> Self {
        let mut rows = [[0.0_f64; 3]; 3];
        for (i, row) in chol.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                rows[i][j] = *v;
            }
        }
        Self { rows }
    }

    /// Applies the factor to one `(foreign, domestic, fx)` triple.
    #[inline]
    fn apply(&self, v: [f64; 3]) -> [f64; 3] {
        let l = &self.rows;
        [
            l[0][0] * v[0],
            l[1][0] * v[0] + l[1][1] * v[1],
            l[2][0] * v[0] + l[2][1] * v[1] + l[2][2] * v[2],
        ]
    }
}

/// Correlated `(foreign, domestic, fx)` path sets, in input shape.
#[derive(Debug, Clone)]
pub struct CorrelatedPaths {
    /// Correlated foreign-rate paths.
    pub foreign: PathMatrix,
    /// Correlated domestic-rate paths.
    pub domestic: PathMatrix,
    /// Correlated FX paths.
    pub fx: PathMatrix,
}

/// Correlates three path sets cell-by-cell with a lower-triangular factor.
///
/// Inputs are read-only; fresh matrices of identical shape are returned.
pub fn impose_correlation(
    factor: &CorrelationFactor,
    foreign: &PathMatrix,
    domestic: &PathMatrix,
    fx: &PathMatrix,
) -> Result<CorrelatedPaths, EngineError> {
    let shape = (foreign.paths(), foreign.points());
    if (domestic.paths(), domestic.points()) != shape || (fx.paths(), fx.points()) != shape {
        return Err(EngineError::ShapeMismatch(format!(
            "foreign {}x{}, domestic {}x{}, fx {}x{}",
            foreign.paths(),
            foreign.points(),
            domestic.paths(),
            domestic.points(),
            fx.paths(),
            fx.points()
        )));
    }

    let mut out_foreign = foreign.clone();
    let mut out_domestic = domestic.clone();
    let mut out_fx = fx.clone();

    for p in 0..foreign.paths() {
        let src_foreign = foreign.path(p);
        let src_domestic = domestic.path(p);
        let src_fx = fx.path(p);
        let dst_foreign = out_foreign.path_mut(p);
        let dst_domestic = out_domestic.path_mut(p);
        let dst_fx = out_fx.path_mut(p);

        for k in 0..src_foreign.len() {
            let [f, d, x] = factor.apply([src_foreign[k], src_domestic[k], src_fx[k]]);
            dst_foreign[k] = f;
            dst_domestic[k] = d;
            dst_fx[k] = x;
        }
    }

    Ok(CorrelatedPaths {
        foreign: out_foreign,
        domestic: out_domestic,
        fx: out_fx,
    })
}

fn one_step_changes(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}
