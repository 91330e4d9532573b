//! Per-minute coefficient series export (CSV).

use anyhow::{Context, Result};
use std::path::Path;

use impactlab_core::domain::minute_label;

use crate::result::StockResult;

pub fn write_coefficients_csv(path: &Path, stock: &StockResult) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create coefficients CSV {}", path.display()))?;

    wtr.write_record(["minute", "time", "alpha", "delta", "r_squared", "points_used"])?;
    for fit in &stock.fits {
        wtr.write_record([
            fit.minute.to_string(),
            minute_label(fit.minute),
            format!("{:.8e}", fit.alpha),
            format!("{:.6}", fit.delta),
            format!("{:.6}", fit.r_squared),
            fit.points_used.to_string(),
        ])?;
    }

    wtr.flush()
        .with_context(|| format!("Failed to flush coefficients CSV {}", path.display()))?;
    Ok(())
}
