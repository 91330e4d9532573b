//! ImpactLab Runner — analysis orchestration, allocation, reporting.
//!
//! This crate builds on `impactlab-core` to provide:
//! - Data loading with an explicit synthetic fallback
//! - Per-stock analysis pipeline (curves, fits, aggregation, allocation)
//! - Fit summary statistics
//! - Run fingerprinting and versioned JSON export
//! - Artifact bundles (manifest, CSV/Parquet tables, markdown report)

pub mod analysis;
pub mod config;
pub mod data_loader;
pub mod reporting;
pub mod result;
pub mod summary;

pub use analysis::{analyze_stock, run_analysis, run_analysis_with, RunError, StockError};
pub use config::{
    AllocationConfig, AnalysisConfig, ConfigError, DataConfig, FitConfig, GridConfig, RunId,
};
pub use data_loader::{load_books, DataSource, LoadError, LoadedData};
pub use reporting::export::{export_json, import_json, load_json, save_json};
pub use reporting::reports::MarkdownReportGenerator;
pub use reporting::{ArtifactManager, ArtifactPaths, StockArtifacts};
pub use result::{AnalysisResult, MeanCurvePoint, SnapshotFit, StockResult, SCHEMA_VERSION};
pub use summary::FitSummary;
