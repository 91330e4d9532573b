//! Summary statistics over fit series — pure functions.
//!
//! Every helper is a pure function: slice in, scalar out, 0.0 on degenerate
//! input. No dependencies on the pipeline or reporting layers.

use serde::{Deserialize, Serialize};

use crate::result::SnapshotFit;

/// Aggregate view of a stock's per-snapshot fits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitSummary {
    pub alpha_mean: f64,
    pub alpha_median: f64,
    pub delta_mean: f64,
    pub delta_std: f64,
    pub r_squared_mean: f64,
    /// Fraction of analyzed snapshots that produced an accepted fit
    pub fit_rate: f64,
}

impl FitSummary {
    pub fn compute(fits: &[SnapshotFit], snapshot_count: usize) -> Self {
        let alphas: Vec<f64> = fits.iter().map(|f| f.alpha).collect();
        let deltas: Vec<f64> = fits.iter().map(|f| f.delta).collect();
        let r2s: Vec<f64> = fits.iter().map(|f| f.r_squared).collect();
        let fit_rate = if snapshot_count == 0 {
            0.0
        } else {
            fits.len() as f64 / snapshot_count as f64
        };
        Self {
            alpha_mean: mean_f64(&alphas),
            alpha_median: median_f64(&alphas),
            delta_mean: mean_f64(&deltas),
            delta_std: std_dev(&deltas),
            r_squared_mean: mean_f64(&r2s),
            fit_rate,
        }
    }
}

pub fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

pub fn median_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
