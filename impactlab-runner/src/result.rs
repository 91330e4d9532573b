//! Analysis result types and schema versioning.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use impactlab_core::allocation::AllocationSchedule;
use impactlab_core::domain::Ticker;
use impactlab_core::fit::PowerLawFit;

use crate::config::RunId;
use crate::data_loader::DataSource;

/// Bumped whenever a persisted result shape changes incompatibly.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// One accepted per-snapshot power-law fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFit {
    pub minute: u32,
    pub alpha: f64,
    pub delta: f64,
    pub r_squared: f64,
    pub points_used: usize,
}

impl SnapshotFit {
    pub fn new(minute: u32, fit: PowerLawFit) -> Self {
        Self {
            minute,
            alpha: fit.alpha,
            delta: fit.delta,
            r_squared: fit.r_squared,
            points_used: fit.points_used,
        }
    }
}

/// One point on a stock's average slippage curve.
///
/// `samples` counts the snapshots where this grid size was feasible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanCurvePoint {
    pub size: f64,
    pub mean_slippage: f64,
    pub samples: usize,
}

/// Complete analysis result for one stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockResult {
    pub ticker: Ticker,

    /// Where the snapshots came from (file or synthetic)
    pub source: DataSource,

    /// Sane snapshots analyzed
    pub snapshot_count: usize,

    /// Rows dropped by the ingest sanity filter
    pub skipped_rows: usize,

    /// Snapshots whose curve could not be fitted
    pub fit_failures: usize,

    /// Grid sizes rejected as exceeding visible depth, summed over snapshots
    pub infeasible_points: usize,

    /// Accepted per-minute fits, ascending by minute
    pub fits: Vec<SnapshotFit>,

    /// Aggregate impact exponent: mean of per-snapshot deltas
    pub delta_mean: f64,

    /// Average slippage curve across snapshots
    pub mean_curve: Vec<MeanCurvePoint>,

    /// Headline fit of the average curve (None when it cannot be fitted)
    pub curve_fit: Option<PowerLawFit>,

    /// Optimal parent-order schedule, one quantity per session minute
    pub schedule: AllocationSchedule,
}

/// Result of a full analysis run across all configured tickers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    pub run_id: RunId,

    pub created_at: chrono::DateTime<chrono::Utc>,

    /// Fingerprint of every loaded book, for reproducibility checks
    pub dataset_hash: String,

    /// Any ticker used synthetic books
    pub has_synthetic: bool,

    pub stocks: Vec<StockResult>,

    /// Tickers that failed terminally, with reasons
    pub failures: BTreeMap<Ticker, String>,
}

impl AnalysisResult {
    pub fn stock(&self, ticker: &str) -> Option<&StockResult> {
        self.stocks.iter().find(|s| s.ticker == ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            schema_version: SCHEMA_VERSION,
            run_id: "deadbeefdeadbeef".into(),
            created_at: chrono::Utc::now(),
            dataset_hash: "abc123".into(),
            has_synthetic: false,
            stocks: vec![StockResult {
                ticker: "AMZN".into(),
                source: DataSource::CsvFile,
                snapshot_count: 390,
                skipped_rows: 0,
                fit_failures: 3,
                infeasible_points: 41,
                fits: vec![SnapshotFit {
                    minute: 0,
                    alpha: 0.011,
                    delta: 0.62,
                    r_squared: 0.97,
                    points_used: 29,
                }],
                delta_mean: 0.62,
                mean_curve: vec![MeanCurvePoint {
                    size: 10.0,
                    mean_slippage: 0.045,
                    samples: 390,
                }],
                curve_fit: None,
                schedule: AllocationSchedule {
                    quantities: vec![5000.0],
                    total_volume: 5000.0,
                    predicted_cost: 12.5,
                    multiplier: 0.9,
                    iterations: 40,
                    residual: 1e-12,
                },
            }],
            failures: BTreeMap::new(),
        }
    }

    #[test]
    fn result_roundtrips_through_json() {
        let result = sample_result();
        let json = serde_json::to_string_pretty(&result).unwrap();
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.schema_version, SCHEMA_VERSION);
        assert_eq!(back.stocks[0].ticker, "AMZN");
        assert_eq!(back.stocks[0].fits.len(), 1);
    }

    #[test]
    fn missing_schema_version_defaults_forward() {
        let mut value: serde_json::Value =
            serde_json::to_value(sample_result()).unwrap();
        value.as_object_mut().unwrap().remove("schema_version");
        let back: AnalysisResult = serde_json::from_value(value).unwrap();
        assert_eq!(back.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn stock_lookup_by_ticker() {
        let result = sample_result();
        assert!(result.stock("AMZN").is_some());
        assert!(result.stock("TSLA").is_none());
    }
}
