//! Shared calibration diagnostics.
//!
//! References:
//! - Nocedal and Wright, *Numerical Optimization* (2nd ed.), Ch. 9 on
//!   derivative-free methods.

use serde::{Deserialize, Serialize};

/// Why an optimization run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Objective spread and simplex diameter both fell below tolerance.
    ObjectiveTolerance,
    /// Iteration budget exhausted before the tolerances were met.
    MaxIterations,
}

/// Convergence metadata attached to every optimizer result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergenceInfo {
    pub iterations: usize,
    pub objective_evaluations: usize,
    pub converged: bool,
    pub reason: TerminationReason,
}
