//! Stochastic models driving the simulation layer.

pub mod cir;
pub mod fx;

pub use cir::{CIR, SimulationResult};
pub use fx::simulate_fx;
