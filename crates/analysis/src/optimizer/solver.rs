//! General-purpose constrained minimizer shared by every allocation
//! method.
//!
//! Projected-gradient descent over the fully-invested simplex with
//! uniform per-asset bounds: numerical central-difference gradients,
//! an adaptive step size that only accepts objective-decreasing moves,
//! and a bisection projection onto `{ lo <= w_i <= hi, sum w = 1 }`.

use portfolio_quant_core::{AnalysisError, Result};

const MAX_ITERS: usize = 500;
const GRAD_STEP: f64 = 1e-6;
const STEP_INIT: f64 = 0.05;
const STEP_MAX: f64 = 0.25;
const STEP_MIN: f64 = 1e-9;
const CONVERGENCE_TOL: f64 = 1e-10;

/// Minimizes `objective` over n weights subject to the fully-invested
/// equality constraint and uniform bounds, starting from equal weight.
///
/// # Errors
/// `AnalysisError::Computation` when the bounds make the constraint
/// infeasible (`n*lo > 1` or `n*hi < 1`) or the objective is not
/// finite at the solution.
pub fn minimize<F>(objective: F, n: usize, lower: f64, upper: f64) -> Result<Vec<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    if n == 0 {
        return Err(AnalysisError::computation(
            "cannot optimize an empty asset set",
        ));
    }
    if n as f64 * lower > 1.0 + 1e-12 || (n as f64) * upper < 1.0 - 1e-12 {
        return Err(AnalysisError::computation(format!(
            "position limits ({lower}, {upper}) cannot sum to 1.0 across {n} assets"
        )));
    }

    let mut w = project(vec![1.0 / n as f64; n], lower, upper);
    let mut best = objective(&w);
    let mut step = STEP_INIT;

    for _ in 0..MAX_ITERS {
        let grad = numerical_gradient(&objective, &w);

        let candidate: Vec<f64> = w
            .iter()
            .zip(grad.iter())
            .map(|(wi, gi)| wi - step * gi)
            .collect();
        let candidate = project(candidate, lower, upper);
        let value = objective(&candidate);

        if value <= best {
            let moved: f64 = w
                .iter()
                .zip(candidate.iter())
                .map(|(a, b)| (a - b).abs())
                .sum();
            w = candidate;
            best = value;
            step = (step * 1.05).min(STEP_MAX);
            if moved < CONVERGENCE_TOL {
                break;
            }
        } else {
            step *= 0.5;
            if step < STEP_MIN {
                break;
            }
        }
    }

    if !best.is_finite() {
        return Err(AnalysisError::computation(format!(
            "objective is not finite at the solution (value {best})"
        )));
    }
    Ok(w)
}

fn numerical_gradient<F>(objective: &F, w: &[f64]) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut grad = vec![0.0; w.len()];
    let mut probe = w.to_vec();
    for i in 0..w.len() {
        let original = probe[i];
        probe[i] = original + GRAD_STEP;
        let up = objective(&probe);
        probe[i] = original - GRAD_STEP;
        let down = objective(&probe);
        probe[i] = original;
        grad[i] = (up - down) / (2.0 * GRAD_STEP);
    }
    grad
}

/// Projects onto `{ lo <= w_i <= hi, sum w = 1 }` by bisecting the
/// shift `tau` in `clamp(w_i - tau)`. The clamped sum is monotone
/// decreasing in `tau`, so bisection converges unconditionally when
/// the bounds are feasible.
fn project(w: Vec<f64>, lower: f64, upper: f64) -> Vec<f64> {
    let min_w = w.iter().copied().fold(f64::MAX, f64::min);
    let max_w = w.iter().copied().fold(f64::MIN, f64::max);
    let mut lo = min_w - upper - 1.0;
    let mut hi = max_w - lower + 1.0;

    for _ in 0..100 {
        let mid = 0.5 * (lo + hi);
        let sum: f64 = w.iter().map(|wi| (wi - mid).clamp(lower, upper)).sum();
        if sum > 1.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let tau = 0.5 * (lo + hi);
    w.into_iter().map(|wi| (wi - tau).clamp(lower, upper)).collect()
}
