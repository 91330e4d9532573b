//! Data loading: per-ticker CSV files with an explicit synthetic fallback.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use impactlab_core::data::{generate_synthetic_books, DataError, LobIngestor};
use impactlab_core::domain::{LobSnapshot, Ticker, MINUTES_PER_SESSION};
use impactlab_core::fingerprint::compute_dataset_hash;

use crate::config::AnalysisConfig;

/// Where a ticker's snapshots came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSource {
    CsvFile,
    Synthetic,
}

/// All books loaded for a run, plus provenance.
///
/// `failures` holds tickers that produced no usable snapshots, keyed to a
/// human-readable reason; analysis continues with the rest.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub books: BTreeMap<Ticker, Vec<LobSnapshot>>,
    pub sources: BTreeMap<Ticker, DataSource>,
    pub skipped_rows: BTreeMap<Ticker, usize>,
    pub failures: BTreeMap<Ticker, String>,
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("No usable tickers: every data file was missing or malformed")]
    NoUsableTickers,
}

/// Loads snapshot files for every configured ticker.
///
/// Per ticker: read `<data_dir>/<TICKER>.csv`; on a missing file, generate
/// synthetic books when the config allows it, otherwise record the failure
/// and continue. The run only fails when no ticker loads at all.
pub fn load_books(config: &AnalysisConfig) -> Result<LoadedData, LoadError> {
    let ingestor = LobIngestor::new();
    let mut books = BTreeMap::new();
    let mut sources = BTreeMap::new();
    let mut skipped_rows = BTreeMap::new();
    let mut failures = BTreeMap::new();
    let mut has_synthetic = false;

    for ticker in &config.data.tickers {
        let path = config.data.data_dir.join(format!("{ticker}.csv"));
        match ingestor.load_csv(&path) {
            Ok(ingested) => {
                if ingested.skipped_rows > 0 {
                    eprintln!(
                        "WARNING: {ticker}: skipped {} malformed snapshot rows",
                        ingested.skipped_rows
                    );
                }
                skipped_rows.insert(ticker.clone(), ingested.skipped_rows);
                books.insert(ticker.clone(), ingested.snapshots);
                sources.insert(ticker.clone(), DataSource::CsvFile);
            }
            Err(DataError::FileNotFound(_)) if config.data.allow_synthetic => {
                eprintln!(
                    "WARNING: {ticker}: no data file at {}, generating synthetic books; \
                     results will be tagged as synthetic",
                    path.display()
                );
                let generated = generate_synthetic_books(ticker, MINUTES_PER_SESSION);
                skipped_rows.insert(ticker.clone(), 0);
                books.insert(ticker.clone(), generated);
                sources.insert(ticker.clone(), DataSource::Synthetic);
                has_synthetic = true;
            }
            Err(err) => {
                eprintln!("WARNING: {ticker}: {err}; skipping");
                failures.insert(ticker.clone(), err.to_string());
            }
        }
    }

    if books.is_empty() {
        return Err(LoadError::NoUsableTickers);
    }

    let dataset_hash = compute_dataset_hash(&books);
    Ok(LoadedData {
        books,
        sources,
        skipped_rows,
        failures,
        dataset_hash,
        has_synthetic,
    })
}
