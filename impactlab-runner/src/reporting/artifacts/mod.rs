//! Artifact manager for persisting run outputs.

mod coefficients;
mod curves;
mod manifest;
mod schedule;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::reporting::reports::MarkdownReportGenerator;
use crate::result::AnalysisResult;

/// Per-stock artifact paths.
#[derive(Debug, Clone)]
pub struct StockArtifacts {
    pub ticker: String,
    pub coefficients_csv: PathBuf,
    pub curve_csv: PathBuf,
    pub schedule_csv: PathBuf,
    pub schedule_parquet: PathBuf,
}

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub manifest: PathBuf,
    pub report_markdown: PathBuf,
    pub stocks: Vec<StockArtifacts>,
}

/// Manages writing all artifacts for a run.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .context("Failed to create artifact output directory")?;
        Ok(Self { output_dir })
    }

    /// Save complete run artifacts under `<output_dir>/<run_id>/`.
    pub fn save_run(&self, result: &AnalysisResult) -> Result<ArtifactPaths> {
        let run_dir = self.output_dir.join(&result.run_id);
        std::fs::create_dir_all(&run_dir)
            .context("Failed to create run artifact directory")?;

        let manifest_path = run_dir.join("manifest.json");
        manifest::write_manifest(&manifest_path, result)?;

        let mut stocks = Vec::with_capacity(result.stocks.len());
        for stock in &result.stocks {
            let coefficients_csv = run_dir.join(format!("{}_coefficients.csv", stock.ticker));
            let curve_csv = run_dir.join(format!("{}_curve.csv", stock.ticker));
            let schedule_csv = run_dir.join(format!("{}_schedule.csv", stock.ticker));
            let schedule_parquet = run_dir.join(format!("{}_schedule.parquet", stock.ticker));

            coefficients::write_coefficients_csv(&coefficients_csv, stock)?;
            curves::write_curve_csv(&curve_csv, stock)?;
            schedule::write_schedule_csv(&schedule_csv, stock)?;
            schedule::write_schedule_parquet(&schedule_parquet, stock)?;

            stocks.push(StockArtifacts {
                ticker: stock.ticker.clone(),
                coefficients_csv,
                curve_csv,
                schedule_csv,
                schedule_parquet,
            });
        }

        let report_markdown = run_dir.join("report.md");
        let report = MarkdownReportGenerator.generate(result);
        std::fs::write(&report_markdown, report)
            .with_context(|| format!("Failed to write report to {}", report_markdown.display()))?;

        Ok(ArtifactPaths {
            run_dir,
            manifest: manifest_path,
            report_markdown,
            stocks,
        })
    }
}
