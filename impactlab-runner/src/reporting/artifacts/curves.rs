//! Average slippage curve export (CSV): empirical points with the fitted
//! overlay, ready for any plotting tool.

use anyhow::{Context, Result};
use std::path::Path;

use crate::result::StockResult;

pub fn write_curve_csv(path: &Path, stock: &StockResult) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create curve CSV {}", path.display()))?;

    wtr.write_record(["size", "mean_slippage", "fitted", "samples"])?;
    for point in &stock.mean_curve {
        let fitted = match &stock.curve_fit {
            Some(fit) => format!("{:.8e}", fit.predict(point.size)),
            None => String::new(),
        };
        wtr.write_record([
            format!("{:.1}", point.size),
            format!("{:.8e}", point.mean_slippage),
            fitted,
            point.samples.to_string(),
        ])?;
    }

    wtr.flush()
        .with_context(|| format!("Failed to flush curve CSV {}", path.display()))?;
    Ok(())
}
