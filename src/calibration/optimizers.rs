//! Derivative-free minimization used by the likelihood calibrators.
//!
//! References:
//! - Nelder and Mead (1965), *A Simplex Method for Function Minimization*.
//! - Nocedal and Wright, *Numerical Optimization* (2nd ed.), Sec. 9.5.

use serde::{Deserialize, Serialize};

use crate::calibration::core::{ConvergenceInfo, TerminationReason};

/// Output of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimisationResult {
    /// Best parameter vector found.
    pub x: Vec<f64>,
    /// Objective value at `x`.
    pub objective: f64,
    pub convergence: ConvergenceInfo,
}

/// Nelder-Mead tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NelderMeadOptions {
    pub max_iterations: usize,
    /// Initial simplex displacement relative to each seed coordinate.
    pub initial_step: f64,
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
    /// Applied to both the objective spread and the simplex diameter.
    pub tolerance: f64,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            max_iterations: 240,
            initial_step: 0.08,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
            tolerance: 1e-7,
        }
    }
}

fn order_by_value(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));
    order
}

/// Minimizes `objective_fn` with an unconstrained Nelder-Mead simplex.
///
/// The objective may return `f64::INFINITY` for parameter vectors it cannot
/// evaluate; such vertices rank worst and the simplex retreats from them. A
/// non-finite objective at the seed itself is an error because the search
/// would have nowhere to start.
pub fn nelder_mead<F>(
    initial: &[f64],
    options: NelderMeadOptions,
    mut objective_fn: F,
) -> Result<OptimisationResult, String>
where
    F: FnMut(&[f64]) -> f64,
{
    let dim = initial.len();
    if dim == 0 {
        return Err("Nelder-Mead requires at least one parameter".to_string());
    }
    if initial.iter().any(|v| !v.is_finite()) {
        return Err("Nelder-Mead initial point must be finite".to_string());
    }

    let mut evaluations = 0usize;
    let seed = initial.to_vec();
    let seed_value = objective_fn(&seed);
    evaluations += 1;
    if !seed_value.is_finite() {
        return Err("objective is not finite at initial point".to_string());
    }

    let mut simplex = Vec::with_capacity(dim + 1);
    let mut values = Vec::with_capacity(dim + 1);
    simplex.push(seed.clone());
    values.push(seed_value);
    for d in 0..dim {
        let mut vertex = seed.clone();
        vertex[d] += vertex[d].abs().max(1.0) * options.initial_step;
        values.push(objective_fn(&vertex));
        evaluations += 1;
        simplex.push(vertex);
    }

    let mut iterations = 0usize;
    let mut converged = false;
    let mut reason = TerminationReason::MaxIterations;

    while iterations < options.max_iterations {
        let order = order_by_value(&values);
        let sorted_simplex: Vec<Vec<f64>> = order.iter().map(|&i| simplex[i].clone()).collect();
        let sorted_values: Vec<f64> = order.iter().map(|&i| values[i]).collect();
        simplex = sorted_simplex;
        values = sorted_values;

        let spread = values[dim] - values[0];
        let diameter = simplex[1..]
            .iter()
            .map(|vertex| {
                vertex
                    .iter()
                    .zip(&simplex[0])
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f64>()
                    .sqrt()
            })
            .fold(0.0, f64::max);
        if spread.abs() <= options.tolerance && diameter <= options.tolerance {
            converged = true;
            reason = TerminationReason::ObjectiveTolerance;
            break;
        }

        iterations += 1;

        let mut centroid = vec![0.0; dim];
        for vertex in simplex.iter().take(dim) {
            for (c, v) in centroid.iter_mut().zip(vertex) {
                *c += v / dim as f64;
            }
        }

        let reflected: Vec<f64> = centroid
            .iter()
            .zip(&simplex[dim])
            .map(|(c, w)| c + options.reflection * (c - w))
            .collect();
        let reflected_value = objective_fn(&reflected);
        evaluations += 1;

        if reflected_value < values[0] {
            let expanded: Vec<f64> = centroid
                .iter()
                .zip(&reflected)
                .map(|(c, r)| c + options.expansion * (r - c))
                .collect();
            let expanded_value = objective_fn(&expanded);
            evaluations += 1;
            if expanded_value < reflected_value {
                simplex[dim] = expanded;
                values[dim] = expanded_value;
            } else {
                simplex[dim] = reflected;
                values[dim] = reflected_value;
            }
        } else if reflected_value < values[dim - 1] {
            simplex[dim] = reflected;
            values[dim] = reflected_value;
        } else {
            let contracted: Vec<f64> = centroid
                .iter()
                .zip(&simplex[dim])
                .map(|(c, w)| c + options.contraction * (w - c))
                .collect();
            let contracted_value = objective_fn(&contracted);
            evaluations += 1;
            if contracted_value < values[dim] {
                simplex[dim] = contracted;
                values[dim] = contracted_value;
            } else {
                for i in 1..=dim {
                    let shrunk: Vec<f64> = simplex[0]
                        .iter()
                        .zip(&simplex[i])
                        .map(|(b, v)| b + options.shrink * (v - b))
                        .collect();
                    values[i] = objective_fn(&shrunk);
                    evaluations += 1;
                    simplex[i] = shrunk;
                }
            }
        }
    }

    let order = order_by_value(&values);
    let best = order[0];
    Ok(OptimisationResult {
        x: simplex[best].clone(),
        objective: values[best],
        convergence: ConvergenceInfo {
            iterations,
            objective_evaluations: evaluations,
            converged,
            reason,
        },
    })
}
