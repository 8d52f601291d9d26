//! Library-wide result and error structures.

/// Engine and model errors surfaced by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Input validation error.
    InvalidInput(String),
    /// Estimation failure: singular design matrix, degenerate likelihood
    /// data, or optimizer non-convergence.
    Calibration(String),
    /// Path-matrix dimensions disagree.
    ShapeMismatch(String),
    /// An observation breaks a numeric guard (e.g. a zero rate under the
    /// `1/sqrt(|r|)` regression terms).
    NumericGuard(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::Calibration(msg) => write!(f, "calibration error: {msg}"),
            Self::ShapeMismatch(msg) => write!(f, "shape mismatch: {msg}"),
            Self::NumericGuard(msg) => write!(f, "numeric guard: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
