//! Monte Carlo path containers and cross-asset correlation.

pub mod correlate;
pub mod paths;

pub use correlate::{CorrelatedPaths, CorrelationFactor, impose_correlation};
pub use paths::PathMatrix;
