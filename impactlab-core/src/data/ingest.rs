use polars::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::data::schema::{LobSchema, SchemaError};
use crate::domain::{BookLevel, LobSnapshot, DEPTH};

/// Result of ingesting one ticker's snapshot file.
///
/// `skipped_rows` counts rows dropped by the sanity filter (void values,
/// crossed books, broken price ladders). Kept snapshots retain their file
/// row index as `minute` so the series stays aligned to the session clock.
#[derive(Debug, Clone)]
pub struct IngestedBook {
    pub snapshots: Vec<LobSnapshot>,
    pub skipped_rows: usize,
}

/// Data ingestor for headerless LOB snapshot CSV files.
pub struct LobIngestor {
    schema: Schema,
}

impl LobIngestor {
    pub fn new() -> Self {
        Self {
            schema: LobSchema::schema(),
        }
    }

    /// Loads one ticker's CSV and converts it to sanity-filtered snapshots.
    pub fn load_csv(&self, path: &Path) -> Result<IngestedBook, DataError> {
        if !path.exists() {
            return Err(DataError::FileNotFound(path.display().to_string()));
        }
        let df = LazyCsvReader::new(path)
            .with_schema(Some(Arc::new(self.schema.clone())))
            .with_has_header(false)
            .finish()
            .map_err(|e| DataError::IngestFailed(e.to_string()))?
            .collect()
            .map_err(|e| DataError::IngestFailed(e.to_string()))?;

        LobSchema::validate(&df)?;
        if df.height() == 0 {
            return Err(DataError::Empty(path.display().to_string()));
        }

        let ingested = dataframe_to_snapshots(&df)?;
        if ingested.snapshots.is_empty() {
            return Err(DataError::AllRowsMalformed(path.display().to_string()));
        }
        Ok(ingested)
    }
}

impl Default for LobIngestor {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes snapshots in the 20-column layout. Atomic: write to .tmp, rename.
pub fn write_csv(path: &Path, snapshots: &[LobSnapshot]) -> Result<(), DataError> {
    let tmp_path = path.with_extension("csv.tmp");
    {
        let mut file = fs::File::create(&tmp_path)?;
        for snap in snapshots {
            let mut fields = Vec::with_capacity(4 * DEPTH);
            for level in &snap.asks {
                fields.push(level.price.to_string());
            }
            for level in &snap.asks {
                fields.push(level.size.to_string());
            }
            for level in &snap.bids {
                fields.push(level.price.to_string());
            }
            for level in &snap.bids {
                fields.push(level.size.to_string());
            }
            writeln!(file, "{}", fields.join(","))?;
        }
        file.flush()?;
    }
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        DataError::Io(e)
    })
}

fn f64_col<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Float64Chunked, DataError> {
    df.column(name)
        .map_err(|e| DataError::IngestFailed(format!("column {name}: {e}")))?
        .f64()
        .map_err(|e| DataError::IngestFailed(format!("column {name} type: {e}")))
}

fn dataframe_to_snapshots(df: &DataFrame) -> Result<IngestedBook, DataError> {
    let mut ask_prices = Vec::with_capacity(DEPTH);
    let mut ask_sizes = Vec::with_capacity(DEPTH);
    let mut bid_prices = Vec::with_capacity(DEPTH);
    let mut bid_sizes = Vec::with_capacity(DEPTH);
    for level in 1..=DEPTH {
        ask_prices.push(f64_col(df, &format!("ask_price_{level}"))?);
        ask_sizes.push(f64_col(df, &format!("ask_size_{level}"))?);
        bid_prices.push(f64_col(df, &format!("bid_price_{level}"))?);
        bid_sizes.push(f64_col(df, &format!("bid_size_{level}"))?);
    }

    // Nulls become NaN and fail the sanity check below.
    let value = |ca: &Float64Chunked, i: usize| ca.get(i).unwrap_or(f64::NAN);

    let n = df.height();
    let mut snapshots = Vec::with_capacity(n);
    let mut skipped_rows = 0;

    for i in 0..n {
        let mut asks = [BookLevel {
            price: 0.0,
            size: 0.0,
        }; DEPTH];
        let mut bids = asks;
        for level in 0..DEPTH {
            asks[level].price = value(ask_prices[level], i);
            asks[level].size = value(ask_sizes[level], i);
            bids[level].price = value(bid_prices[level], i);
            bids[level].size = value(bid_sizes[level], i);
        }
        let snap = LobSnapshot {
            minute: i as u32,
            asks,
            bids,
        };
        if snap.is_sane() {
            snapshots.push(snap);
        } else {
            skipped_rows += 1;
        }
    }

    Ok(IngestedBook {
        snapshots,
        skipped_rows,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Data file not found: {0}")]
    FileNotFound(String),

    #[error("Ingest failed: {0}")]
    IngestFailed(String),

    #[error("Schema validation failed: {0}")]
    Schema(#[from] SchemaError),

    #[error("No rows in {0}")]
    Empty(String),

    #[error("Every row failed the sanity check in {0}")]
    AllRowsMalformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
