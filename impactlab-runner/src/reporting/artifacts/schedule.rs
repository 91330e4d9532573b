//! Allocation schedule export (CSV/Parquet).

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame, NamedFrom, ParquetWriter, Series};
use std::fs::File;
use std::path::Path;

use impactlab_core::domain::minute_label;

use crate::result::StockResult;

/// Fitted alpha per minute slot, None where the minute had no usable fit.
fn alpha_slots(stock: &StockResult) -> Vec<Option<f64>> {
    let mut alphas = vec![None; stock.schedule.quantities.len()];
    for fit in &stock.fits {
        if (fit.minute as usize) < alphas.len() {
            alphas[fit.minute as usize] = Some(fit.alpha);
        }
    }
    alphas
}

pub fn write_schedule_csv(path: &Path, stock: &StockResult) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create schedule CSV {}", path.display()))?;

    let alphas = alpha_slots(stock);
    wtr.write_record(["minute", "time", "alpha", "quantity"])?;
    for (minute, quantity) in stock.schedule.quantities.iter().enumerate() {
        let alpha = match alphas[minute] {
            Some(a) => format!("{:.8e}", a),
            None => String::new(),
        };
        wtr.write_record([
            minute.to_string(),
            minute_label(minute as u32),
            alpha,
            format!("{:.4}", quantity),
        ])?;
    }

    wtr.flush()
        .with_context(|| format!("Failed to flush schedule CSV {}", path.display()))?;
    Ok(())
}

pub fn write_schedule_parquet(path: &Path, stock: &StockResult) -> Result<()> {
    let n = stock.schedule.quantities.len();
    let minutes: Vec<u32> = (0..n as u32).collect();
    let times: Vec<String> = minutes.iter().map(|&m| minute_label(m)).collect();
    let alphas = alpha_slots(stock);
    let quantities = stock.schedule.quantities.clone();

    let mut df = DataFrame::new(vec![
        Column::Series(Series::new("minute".into(), minutes).into()),
        Column::Series(Series::new("time".into(), times).into()),
        Column::Series(Series::new("alpha".into(), alphas).into()),
        Column::Series(Series::new("quantity".into(), quantities).into()),
    ])
    .context("Failed to build schedule dataframe")?;

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create schedule parquet {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("Failed to write schedule parquet")?;
    Ok(())
}
