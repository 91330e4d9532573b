//! Integration tests for the full analysis pipeline.
//!
//! These drive the runner end to end: CSV books on disk, analysis across
//! tickers, artifact export, and JSON round-trips.

use std::path::Path;

use impactlab_core::data::{generate_synthetic_books, write_csv};
use impactlab_core::domain::MINUTES_PER_SESSION;
use impactlab_runner::reporting::export::{load_json, save_json};
use impactlab_runner::reporting::ArtifactManager;
use impactlab_runner::{run_analysis_with, AnalysisConfig, DataSource, RunError};

fn write_books(dir: &Path, tickers: &[&str], rows: u32) {
    for ticker in tickers {
        let books = generate_synthetic_books(ticker, rows);
        write_csv(&dir.join(format!("{ticker}.csv")), &books).unwrap();
    }
}

fn config_for(dir: &Path, tickers: &[&str]) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.data.data_dir = dir.to_path_buf();
    config.data.tickers = tickers.iter().map(|t| t.to_string()).collect();
    config.allocation.total_volume = 2_000.0;
    config
}

#[test]
fn full_run_from_csv_files() {
    let dir = tempfile::tempdir().unwrap();
    write_books(dir.path(), &["AMZN", "MSFT", "GOOG"], 60);

    let config = config_for(dir.path(), &["AMZN", "MSFT", "GOOG"]);
    let result = run_analysis_with(&config, true).unwrap();

    assert_eq!(result.run_id.len(), 16);
    assert_eq!(result.dataset_hash.len(), 64);
    assert_eq!(result.stocks.len(), 3);
    assert!(result.failures.is_empty());
    assert!(!result.has_synthetic);

    for stock in &result.stocks {
        assert_eq!(stock.source, DataSource::CsvFile);
        assert_eq!(stock.snapshot_count, 60);
        assert!(!stock.fits.is_empty(), "{} produced no fits", stock.ticker);
        assert!(stock.delta_mean.is_finite());

        let total: f64 = stock.schedule.quantities.iter().sum();
        assert!(
            (total - 2_000.0).abs() / 2_000.0 < 1e-6,
            "{} schedule sums to {total}, expected 2000",
            stock.ticker
        );
        assert!(stock.schedule.quantities.iter().all(|q| *q >= 0.0));
    }
}

#[test]
fn same_inputs_reproduce_hash_and_run_id() {
    let dir = tempfile::tempdir().unwrap();
    write_books(dir.path(), &["AMZN"], 40);
    let config = config_for(dir.path(), &["AMZN"]);

    let first = run_analysis_with(&config, false).unwrap();
    let second = run_analysis_with(&config, false).unwrap();

    assert_eq!(first.run_id, second.run_id);
    assert_eq!(first.dataset_hash, second.dataset_hash);
    assert_eq!(
        first.stocks[0].schedule.quantities,
        second.stocks[0].schedule.quantities
    );
}

#[test]
fn artifacts_land_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    write_books(dir.path(), &["AMZN", "MSFT"], 45);
    let config = config_for(dir.path(), &["AMZN", "MSFT"]);
    let result = run_analysis_with(&config, false).unwrap();

    let out = tempfile::tempdir().unwrap();
    let manager = ArtifactManager::new(out.path()).unwrap();
    let paths = manager.save_run(&result).unwrap();

    assert!(paths.manifest.exists());
    assert!(paths.report_markdown.exists());
    assert_eq!(paths.stocks.len(), 2);
    for stock in &paths.stocks {
        assert!(stock.coefficients_csv.exists());
        assert!(stock.curve_csv.exists());
        assert!(stock.schedule_csv.exists());
        assert!(stock.schedule_parquet.exists());
    }

    let report = std::fs::read_to_string(&paths.report_markdown).unwrap();
    assert!(report.contains("## AMZN"));
    assert!(report.contains("## MSFT"));
    assert!(report.contains(&format!("`{}`", result.run_id)));

    // The parquet schedule reads back with one row per session minute.
    use polars::prelude::{ParquetReader, SerReader};
    let file = std::fs::File::open(&paths.stocks[0].schedule_parquet).unwrap();
    let df = ParquetReader::new(file).finish().unwrap();
    assert_eq!(df.height(), result.stocks[0].schedule.quantities.len());
    assert!(df.column("minute").is_ok());
    assert!(df.column("quantity").is_ok());
}

#[test]
fn manifest_json_reimports() {
    let dir = tempfile::tempdir().unwrap();
    write_books(dir.path(), &["GOOG"], 30);
    let config = config_for(dir.path(), &["GOOG"]);
    let result = run_analysis_with(&config, false).unwrap();

    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("result.json");
    save_json(&path, &result).unwrap();
    let back = load_json(&path).unwrap();

    assert_eq!(back.run_id, result.run_id);
    assert_eq!(back.stocks.len(), 1);
    assert_eq!(back.stocks[0].fits.len(), result.stocks[0].fits.len());
    assert_eq!(back.dataset_hash, result.dataset_hash);
}

#[test]
fn synthetic_fallback_tags_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path(), &["AMZN", "MSFT"]);
    config.data.allow_synthetic = true;

    let result = run_analysis_with(&config, false).unwrap();
    assert!(result.has_synthetic);
    assert_eq!(result.stocks.len(), 2);
    for stock in &result.stocks {
        assert_eq!(stock.source, DataSource::Synthetic);
        assert_eq!(stock.snapshot_count, MINUTES_PER_SESSION as usize);
    }
}

#[test]
fn missing_data_without_fallback_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &["AMZN"]);

    let err = run_analysis_with(&config, false).unwrap_err();
    assert!(matches!(err, RunError::Load(_)));
}

#[test]
fn partial_universe_survives_a_bad_ticker() {
    let dir = tempfile::tempdir().unwrap();
    write_books(dir.path(), &["AMZN"], 30);
    // MSFT's file is present but holds garbage.
    std::fs::write(dir.path().join("MSFT.csv"), "not,a,book\n").unwrap();

    let config = config_for(dir.path(), &["AMZN", "MSFT"]);
    let result = run_analysis_with(&config, false).unwrap();

    assert_eq!(result.stocks.len(), 1);
    assert_eq!(result.stocks[0].ticker, "AMZN");
    assert!(result.failures.contains_key("MSFT"));
}
