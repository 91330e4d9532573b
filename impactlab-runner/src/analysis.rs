//! Analysis pipeline: curves, fits, aggregation, allocation.

use rayon::prelude::*;

use impactlab_core::allocation::{allocate, AllocationError};
use impactlab_core::domain::LobSnapshot;
use impactlab_core::fit::fit_power_law;
use impactlab_core::slippage::{curve, CurvePoint, SizeGrid, SlippageCurve};

use crate::config::{AnalysisConfig, ConfigError};
use crate::data_loader::{load_books, DataSource, LoadError};
use crate::result::{AnalysisResult, MeanCurvePoint, SnapshotFit, StockResult, SCHEMA_VERSION};
use crate::summary::mean_f64;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Every stock failed analysis")]
    AllStocksFailed,
}

/// Terminal per-stock failure. The run carries on with the other stocks.
#[derive(Debug, thiserror::Error)]
pub enum StockError {
    #[error("No snapshot produced a usable fit")]
    NoUsableFits,

    #[error("Allocation failed: {0}")]
    Allocation(#[from] AllocationError),
}

/// Runs the full pipeline for every configured ticker, fitting snapshots
/// in parallel.
pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisResult, RunError> {
    run_analysis_with(config, true)
}

/// As [`run_analysis`], with explicit control over Rayon use.
pub fn run_analysis_with(config: &AnalysisConfig, parallel: bool) -> Result<AnalysisResult, RunError> {
    config.validate()?;
    let loaded = load_books(config)?;

    let mut stocks = Vec::new();
    let mut failures = loaded.failures.clone();

    for (ticker, snapshots) in &loaded.books {
        let source = loaded.sources[ticker];
        let skipped_rows = loaded.skipped_rows.get(ticker).copied().unwrap_or(0);
        match analyze_stock(ticker, snapshots, source, skipped_rows, config, parallel) {
            Ok(stock) => stocks.push(stock),
            Err(err) => {
                eprintln!("WARNING: {ticker}: {err}");
                failures.insert(ticker.clone(), err.to_string());
            }
        }
    }

    if stocks.is_empty() {
        return Err(RunError::AllStocksFailed);
    }

    Ok(AnalysisResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        created_at: chrono::Utc::now(),
        dataset_hash: loaded.dataset_hash,
        has_synthetic: loaded.has_synthetic,
        stocks,
        failures,
    })
}

/// Full pipeline for one stock's snapshot series.
pub fn analyze_stock(
    ticker: &str,
    snapshots: &[LobSnapshot],
    source: DataSource,
    skipped_rows: usize,
    config: &AnalysisConfig,
    parallel: bool,
) -> Result<StockResult, StockError> {
    let grid = config.size_grid();

    let curves: Vec<SlippageCurve> = if parallel {
        snapshots.par_iter().map(|snap| curve(snap, &grid)).collect()
    } else {
        snapshots.iter().map(|snap| curve(snap, &grid)).collect()
    };

    let min_points = config.fit.min_points;
    let fit_one = |slice: &SlippageCurve| -> Option<SnapshotFit> {
        match fit_power_law(&slice.points) {
            Ok(fit) if fit.points_used >= min_points => {
                Some(SnapshotFit::new(slice.minute, fit))
            }
            _ => None,
        }
    };
    let maybe_fits: Vec<Option<SnapshotFit>> = if parallel {
        curves.par_iter().map(fit_one).collect()
    } else {
        curves.iter().map(fit_one).collect()
    };

    let fits: Vec<SnapshotFit> = maybe_fits.into_iter().flatten().collect();
    let fit_failures = curves.len() - fits.len();
    let infeasible_points: usize = curves.iter().map(|c| c.skipped).sum();

    if fits.is_empty() {
        return Err(StockError::NoUsableFits);
    }

    let deltas: Vec<f64> = fits.iter().map(|f| f.delta).collect();
    let delta_mean = mean_f64(&deltas);

    let mean_curve = mean_curve(&curves, &grid);
    let curve_points: Vec<CurvePoint> = mean_curve
        .iter()
        .map(|p| CurvePoint {
            size: p.size,
            slippage: p.mean_slippage,
        })
        .collect();
    let curve_fit = fit_power_law(&curve_points).ok();

    // One alpha slot per session minute up to the latest snapshot; minutes
    // without an accepted fit stay None and receive no volume.
    let slots = snapshots
        .iter()
        .map(|s| s.minute as usize + 1)
        .max()
        .unwrap_or(0);
    let mut alphas: Vec<Option<f64>> = vec![None; slots];
    for fit in &fits {
        alphas[fit.minute as usize] = Some(fit.alpha);
    }

    let schedule = allocate(
        &alphas,
        delta_mean,
        config.allocation.total_volume,
        &config.solver_settings(),
    )?;

    Ok(StockResult {
        ticker: ticker.to_string(),
        source,
        snapshot_count: snapshots.len(),
        skipped_rows,
        fit_failures,
        infeasible_points,
        fits,
        delta_mean,
        mean_curve,
        curve_fit,
        schedule,
    })
}

/// Averages feasible slippages per grid size across all snapshots.
fn mean_curve(curves: &[SlippageCurve], grid: &SizeGrid) -> Vec<MeanCurvePoint> {
    let sizes = grid.sizes();
    let mut sums = vec![0.0; sizes.len()];
    let mut counts = vec![0usize; sizes.len()];

    for slice in curves {
        for point in &slice.points {
            // Curve points come from the same grid, so the index recovers
            // exactly.
            let index = ((point.size - grid.min) / grid.step).round() as usize;
            if index < sizes.len() {
                sums[index] += point.slippage;
                counts[index] += 1;
            }
        }
    }

    sizes
        .iter()
        .zip(sums.iter().zip(&counts))
        .filter(|(_, (_, &count))| count > 0)
        .map(|(&size, (&sum, &count))| MeanCurvePoint {
            size,
            mean_slippage: sum / count as f64,
            samples: count,
        })
        .collect()
}
