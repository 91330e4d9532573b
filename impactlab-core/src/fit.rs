//! Power-law fitting of slippage curves.
//!
//! The model g(x) = alpha * x^delta is linear in log space,
//! ln g = ln alpha + delta * ln x, so the fit is ordinary least squares on
//! the log-transformed points. Only strictly positive samples can enter the
//! transform; curves with fewer than two usable points cannot be fitted.

use serde::{Deserialize, Serialize};

use crate::slippage::CurvePoint;

/// Hard minimum of usable points for a line fit.
pub const MIN_FIT_POINTS: usize = 2;

/// Fitted power-law coefficients for one curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerLawFit {
    pub alpha: f64,
    pub delta: f64,
    pub r_squared: f64,
    pub points_used: usize,
}

impl PowerLawFit {
    /// Model slippage at order size x.
    pub fn predict(&self, x: f64) -> f64 {
        self.alpha * x.powf(self.delta)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FitError {
    #[error("Insufficient valid points for fit: have {have}, need {need}")]
    InsufficientPoints { have: usize, need: usize },

    #[error("Degenerate fit: {0}")]
    Degenerate(String),
}

/// Fits g(x) = alpha * x^delta to the curve by OLS in log-log space.
///
/// Points with non-positive size or slippage are excluded before the
/// transform. Fails when fewer than two points remain, when the log sizes
/// carry no variance, or when the recovered coefficients are not finite
/// and positive.
pub fn fit_power_law(points: &[CurvePoint]) -> Result<PowerLawFit, FitError> {
    let log_points: Vec<(f64, f64)> = points
        .iter()
        .filter(|p| p.size > 0.0 && p.slippage > 0.0)
        .map(|p| (p.size.ln(), p.slippage.ln()))
        .collect();

    if log_points.len() < MIN_FIT_POINTS {
        return Err(FitError::InsufficientPoints {
            have: log_points.len(),
            need: MIN_FIT_POINTS,
        });
    }

    let (slope, intercept) = ols_line(&log_points)
        .ok_or_else(|| FitError::Degenerate("zero variance in log sizes".to_string()))?;

    let alpha = intercept.exp();
    let delta = slope;
    if !alpha.is_finite() || alpha <= 0.0 || !delta.is_finite() {
        return Err(FitError::Degenerate(format!(
            "non-finite coefficients: alpha={alpha}, delta={delta}"
        )));
    }

    Ok(PowerLawFit {
        alpha,
        delta,
        r_squared: r_squared(&log_points, slope, intercept),
        points_used: log_points.len(),
    })
}

/// Least-squares line through (x, y) points: returns (slope, intercept),
/// or None when x carries no variance.
fn ols_line(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in points {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }

    if sxx <= f64::EPSILON {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}

/// Coefficient of determination of the line fit in log space.
fn r_squared(points: &[(f64, f64)], slope: f64, intercept: f64) -> f64 {
    let n = points.len() as f64;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (x, y) in points {
        let fitted = intercept + slope * x;
        ss_res += (y - fitted) * (y - fitted);
        ss_tot += (y - mean_y) * (y - mean_y);
    }

    if ss_tot <= f64::EPSILON {
        return 1.0;
    }
    (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn power_curve(alpha: f64, delta: f64, sizes: &[f64]) -> Vec<CurvePoint> {
        sizes
            .iter()
            .map(|&size| CurvePoint {
                size,
                slippage: alpha * size.powf(delta),
            })
            .collect()
    }

    #[test]
    fn exact_power_law_roundtrips() {
        let sizes: Vec<f64> = (1..=29).map(|i| 10.0 * i as f64).collect();
        let points = power_curve(2.0, 0.5, &sizes);
        let fit = fit_power_law(&points).unwrap();
        assert!((fit.alpha - 2.0).abs() < 1e-9, "alpha = {}", fit.alpha);
        assert!((fit.delta - 0.5).abs() < 1e-9, "delta = {}", fit.delta);
        assert!(fit.r_squared > 0.999999);
        assert_eq!(fit.points_used, 29);
    }

    #[test]
    fn predict_inverts_the_fit() {
        let sizes = [10.0, 50.0, 100.0, 200.0];
        let points = power_curve(0.003, 0.7, &sizes);
        let fit = fit_power_law(&points).unwrap();
        for p in &points {
            assert!((fit.predict(p.size) - p.slippage).abs() < 1e-9);
        }
    }

    #[test]
    fn noisy_curve_recovers_approximate_exponent() {
        let sizes: Vec<f64> = (1..=29).map(|i| 10.0 * i as f64).collect();
        let points: Vec<CurvePoint> = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| {
                let bump = if i % 2 == 0 { 1.02 } else { 0.98 };
                CurvePoint {
                    size,
                    slippage: 0.05 * size.powf(0.6) * bump,
                }
            })
            .collect();
        let fit = fit_power_law(&points).unwrap();
        assert!((fit.delta - 0.6).abs() < 0.02);
        assert!(fit.r_squared > 0.99);
    }

    #[test]
    fn non_positive_samples_are_excluded() {
        let mut points = power_curve(1.0, 0.5, &[10.0, 20.0, 30.0, 40.0]);
        points.push(CurvePoint { size: 50.0, slippage: 0.0 });
        points.push(CurvePoint { size: 60.0, slippage: -0.1 });
        let fit = fit_power_law(&points).unwrap();
        assert_eq!(fit.points_used, 4);
        assert!((fit.delta - 0.5).abs() < 1e-9);
    }

    #[test]
    fn too_few_points_fail() {
        let err = fit_power_law(&power_curve(1.0, 0.5, &[10.0])).unwrap_err();
        assert!(matches!(
            err,
            FitError::InsufficientPoints { have: 1, need: 2 }
        ));

        let all_zero = vec![
            CurvePoint { size: 10.0, slippage: 0.0 },
            CurvePoint { size: 20.0, slippage: 0.0 },
        ];
        assert!(fit_power_law(&all_zero).is_err());
    }

    #[test]
    fn repeated_sizes_are_degenerate() {
        let points = vec![
            CurvePoint { size: 10.0, slippage: 0.1 },
            CurvePoint { size: 10.0, slippage: 0.2 },
            CurvePoint { size: 10.0, slippage: 0.3 },
        ];
        let err = fit_power_law(&points).unwrap_err();
        assert!(matches!(err, FitError::Degenerate(_)));
    }

    #[test]
    fn flat_curve_fits_with_zero_exponent() {
        let points = vec![
            CurvePoint { size: 10.0, slippage: 0.05 },
            CurvePoint { size: 20.0, slippage: 0.05 },
            CurvePoint { size: 40.0, slippage: 0.05 },
        ];
        let fit = fit_power_law(&points).unwrap();
        assert!(fit.delta.abs() < 1e-12);
        assert!((fit.alpha - 0.05).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }
}
