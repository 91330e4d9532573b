//! Convex allocation of a parent order across session minutes.
//!
//! Minimizes total predicted impact cost
//!
//! ```text
//! sum_t alpha_t * x_t^(1+delta)   s.t.   sum_t x_t = S,  x_t >= 0
//! ```
//!
//! Stationarity gives (1+delta) * alpha_t * x_t^delta = lambda for every
//! active minute, so
//!
//! ```text
//! x_t(lambda) = (lambda / ((1+delta) * alpha_t))^(1/delta)
//! ```
//!
//! which is strictly increasing in lambda. The budget constraint is solved
//! by bisection on lambda, then the quantities are rescaled so the budget
//! holds exactly. Cheap minutes (low alpha) receive more volume, in
//! proportion to alpha_t^(-1/delta).

use serde::{Deserialize, Serialize};

/// Solver knobs for the bisection on the KKT multiplier.
///
/// `alpha_floor` clamps fitted coefficients from below so a pathological
/// near-zero alpha cannot absorb the entire parent order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverSettings {
    pub alpha_floor: f64,
    pub tolerance: f64,
    pub max_iters: u32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            alpha_floor: 1e-12,
            tolerance: 1e-9,
            max_iters: 200,
        }
    }
}

/// Optimal schedule for one stock.
///
/// `quantities` has one entry per input minute; minutes without a usable
/// fit hold 0. `predicted_cost` is the model cost of the schedule and
/// `multiplier` the KKT lambda at convergence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationSchedule {
    pub quantities: Vec<f64>,
    pub total_volume: f64,
    pub predicted_cost: f64,
    pub multiplier: f64,
    pub iterations: u32,
    pub residual: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("Parent order volume must be positive and finite, got {0}")]
    InvalidVolume(f64),

    #[error("Impact exponent must be positive and finite, got {0}")]
    InvalidExponent(f64),

    #[error("No minutes with a usable fit to allocate across")]
    NoFittedMinutes,

    #[error("Bisection failed to converge after {iterations} iterations (residual {residual:.3e})")]
    NoConvergence { iterations: u32, residual: f64 },
}

/// Splits `total_volume` across minutes to minimize predicted impact cost.
///
/// `alphas[t]` is the fitted per-minute coefficient, or None when minute t
/// has no usable fit; such minutes receive quantity 0. `delta` is the
/// aggregate impact exponent shared across minutes.
pub fn allocate(
    alphas: &[Option<f64>],
    delta: f64,
    total_volume: f64,
    settings: &SolverSettings,
) -> Result<AllocationSchedule, AllocationError> {
    if !total_volume.is_finite() || total_volume <= 0.0 {
        return Err(AllocationError::InvalidVolume(total_volume));
    }
    if !delta.is_finite() || delta <= 0.0 {
        return Err(AllocationError::InvalidExponent(delta));
    }

    let active: Vec<(usize, f64)> = alphas
        .iter()
        .enumerate()
        .filter_map(|(t, alpha)| alpha.map(|a| (t, a.max(settings.alpha_floor))))
        .collect();
    if active.is_empty() {
        return Err(AllocationError::NoFittedMinutes);
    }

    let coeff = 1.0 + delta;
    let exponent = 1.0 / delta;
    let share = |lambda: f64, alpha: f64| (lambda / (coeff * alpha)).powf(exponent);
    let budget = |lambda: f64| -> f64 {
        active
            .iter()
            .map(|&(_, alpha)| share(lambda, alpha))
            .sum()
    };

    // At lambda_hi every active minute alone already covers S, so the
    // budget function brackets S on [0, lambda_hi].
    let alpha_max = active.iter().map(|&(_, a)| a).fold(f64::MIN, f64::max);
    let mut lo = 0.0;
    let mut hi = coeff * alpha_max * total_volume.powf(delta);
    if !hi.is_finite() {
        return Err(AllocationError::NoConvergence {
            iterations: 0,
            residual: f64::INFINITY,
        });
    }

    let mut residual = f64::INFINITY;
    let mut converged = None;
    for iter in 1..=settings.max_iters {
        let lambda = 0.5 * (lo + hi);
        let total = budget(lambda);
        residual = (total - total_volume).abs() / total_volume;
        if residual <= settings.tolerance {
            converged = Some((iter, lambda));
            break;
        }
        if total < total_volume {
            lo = lambda;
        } else {
            hi = lambda;
        }
    }
    let Some((iterations, lambda)) = converged else {
        return Err(AllocationError::NoConvergence {
            iterations: settings.max_iters,
            residual,
        });
    };

    // Exact budget: rescale the converged shares onto S.
    let raw: Vec<f64> = active
        .iter()
        .map(|&(_, alpha)| share(lambda, alpha))
        .collect();
    let raw_total: f64 = raw.iter().sum();
    let scale = total_volume / raw_total;

    let mut quantities = vec![0.0; alphas.len()];
    let mut predicted_cost = 0.0;
    for (&(t, alpha), &raw_share) in active.iter().zip(&raw) {
        let x = raw_share * scale;
        quantities[t] = x;
        predicted_cost += alpha * x.powf(coeff);
    }

    Ok(AllocationSchedule {
        quantities,
        total_volume,
        predicted_cost,
        multiplier: lambda,
        iterations,
        residual,
    })
}
