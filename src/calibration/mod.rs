//! Historical calibration of the short-rate model.
//!
//! `fit_least_squares` turns a rate series into a closed-form seed and
//! `fit_maximum_likelihood` refines that seed with a simplex search. Both
//! are pure functions of the series they are given; assembling and aligning
//! history is the caller's job.

pub mod cir;
pub mod core;
pub mod optimizers;

pub use self::core::{ConvergenceInfo, TerminationReason};
pub use cir::{CirFit, Likelihood, fit_least_squares, fit_maximum_likelihood};
pub use optimizers::{NelderMeadOptions, OptimisationResult, nelder_mead};
