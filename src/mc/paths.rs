//! Dense path storage for simulation output.

use crate::core::EngineError;

/// An `n_paths x n_points` grid of simulated values, stored row-major.
///
/// Row `i` is simulation `i`; column `k` is time point `k`, with column 0
/// holding the start value. The simulators fill the matrix in place;
/// consumers read it through [`PathMatrix::value`] and [`PathMatrix::path`].
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatrix {
    data: Vec<f64>,
    paths: usize,
    points: usize,
}

impl PathMatrix {
    /// Allocates a matrix with every path starting at `start` and all later
    /// points zeroed, ready for a simulator to fill.
    pub(crate) fn with_start(start: f64, paths: usize, points: usize) -> Self {
        let mut data = vec![0.0; paths * points];
        for p in 0..paths {
            data[p * points] = start;
        }
        Self {
            data,
            paths,
            points,
        }
    }

    /// Builds a matrix from explicit path rows.
    ///
    /// Rows must be non-empty, of equal length, and finite throughout.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, EngineError> {
        if rows.is_empty() {
            return Err(EngineError::InvalidInput(
                "path matrix requires at least one path".to_string(),
            ));
        }
        let points = rows[0].len();
        if points == 0 {
            return Err(EngineError::InvalidInput(
                "path matrix requires at least one time point".to_string(),
            ));
        }
        if rows.iter().any(|row| row.len() != points) {
            return Err(EngineError::ShapeMismatch(
                "path rows must all have the same length".to_string(),
            ));
        }
        if rows.iter().flatten().any(|v| !v.is_finite()) {
            return Err(EngineError::InvalidInput(
                "path values must be finite".to_string(),
            ));
        }

        let paths = rows.len();
        let mut data = Vec::with_capacity(paths * points);
        for row in rows {
            data.extend_from_slice(&row);
        }
        Ok(Self {
            data,
            paths,
            points,
        })
    }

    /// Number of simulated paths (rows).
    #[inline]
    pub fn paths(&self) -> usize {
        self.paths
    }

    /// Number of time points per path, including the start column.
    #[inline]
    pub fn points(&self) -> usize {
        self.points
    }

    /// Number of simulated steps, `points() - 1`.
    #[inline]
    pub fn steps(&self) -> usize {
        self.points - 1
    }

    /// Value of path `path` at time point `point`.
    #[inline]
    pub fn value(&self, path: usize, point: usize) -> f64 {
        self.data[path * self.points + point]
    }

    /// One full path as a slice.
    #[inline]
    pub fn path(&self, path: usize) -> &[f64] {
        &self.data[path * self.points..(path + 1) * self.points]
    }

    #[inline]
    pub(crate) fn path_mut(&mut self, path: usize) -> &mut [f64] {
        &mut self.data[path * self.points..(path + 1) * self.points]
    }

    /// Iterator over mutable path rows, in path order.
    #[inline]
    pub(crate) fn rows_mut(&mut self) -> std::slice::ChunksMut<'_, f64> {
        self.data.chunks_mut(self.points)
    }

    /// Parallel iterator over mutable path rows.
    #[cfg(feature = "parallel")]
    #[inline]
    pub(crate) fn par_rows_mut(&mut self) -> rayon::slice::ChunksMut<'_, f64> {
        use rayon::prelude::*;
        self.data.par_chunks_mut(self.points)
    }

    /// The terminal column across all paths.
    pub fn terminal(&self) -> Vec<f64> {
        (0..self.paths)
            .map(|p| self.value(p, self.points - 1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_start_seeds_column_zero_only() {
        let m = PathMatrix::with_start(42.0, 3, 4);
        assert_eq!(m.paths(), 3);
        assert_eq!(m.points(), 4);
        assert_eq!(m.steps(), 3);
        for p in 0..3 {
            assert_eq!(m.value(p, 0), 42.0);
            assert_eq!(&m.path(p)[1..], &[0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn from_rows_preserves_layout() {
        let m = PathMatrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.path(0), &[1.0, 2.0, 3.0]);
        assert_eq!(m.path(1), &[4.0, 5.0, 6.0]);
        assert_eq!(m.value(1, 2), 6.0);
        assert_eq!(m.terminal(), vec![3.0, 6.0]);
    }

    #[test]
    fn from_rows_rejects_malformed_input() {
        assert!(PathMatrix::from_rows(vec![]).is_err());
        assert!(PathMatrix::from_rows(vec![vec![]]).is_err());
        assert!(PathMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
        assert!(PathMatrix::from_rows(vec![vec![1.0, f64::NAN]]).is_err());
    }
}
