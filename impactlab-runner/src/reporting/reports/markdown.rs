//! Markdown report generator.

use impactlab_core::domain::minute_label;

use crate::result::{AnalysisResult, StockResult};
use crate::summary::FitSummary;

pub struct MarkdownReportGenerator;

impl MarkdownReportGenerator {
    pub fn generate(&self, result: &AnalysisResult) -> String {
        let mut report = format!(
            "# ImpactLab Run Report\n\n\
Run ID: `{}`\n\
Created: {}\n\
Dataset hash: `{}`\n",
            result.run_id,
            result.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            result.dataset_hash,
        );
        if result.has_synthetic {
            report.push_str("\n**Note**: one or more tickers used synthetic books.\n");
        }

        for stock in &result.stocks {
            self.push_stock_section(&mut report, stock);
        }

        if !result.failures.is_empty() {
            report.push_str("\n## Failures\n\n");
            report.push_str("| Ticker | Reason |\n");
            report.push_str("|--------|--------|\n");
            for (ticker, reason) in &result.failures {
                report.push_str(&format!("| {} | {} |\n", ticker, reason));
            }
        }

        report.push_str(
            "\n## Notes\n\
- Coefficient series, curve tables, and schedules are exported alongside this report.\n",
        );

        report
    }

    fn push_stock_section(&self, report: &mut String, stock: &StockResult) {
        let summary = FitSummary::compute(&stock.fits, stock.snapshot_count);

        report.push_str(&format!(
            "\n## {} ({:?})\n\n\
- Snapshots analyzed: {} (skipped rows: {})\n\
- Fits accepted: {} ({:.1}% of snapshots, {} failures)\n\
- Infeasible grid points: {}\n",
            stock.ticker,
            stock.source,
            stock.snapshot_count,
            stock.skipped_rows,
            stock.fits.len(),
            summary.fit_rate * 100.0,
            stock.fit_failures,
            stock.infeasible_points,
        ));

        report.push_str(&format!(
            "\n### Fit Summary\n\
| Statistic | Value |\n\
|-----------|-------|\n\
| alpha mean | {:.6e} |\n\
| alpha median | {:.6e} |\n\
| delta mean | {:.4} |\n\
| delta std | {:.4} |\n\
| r-squared mean | {:.4} |\n",
            summary.alpha_mean,
            summary.alpha_median,
            summary.delta_mean,
            summary.delta_std,
            summary.r_squared_mean,
        ));

        if let Some(fit) = &stock.curve_fit {
            report.push_str(&format!(
                "\nAverage curve fit: g(x) = {:.6e} * x^{:.4} (r-squared {:.4})\n",
                fit.alpha, fit.delta, fit.r_squared
            ));
        }

        if !stock.mean_curve.is_empty() {
            report.push_str(
                "\n### Average Slippage Curve\n\n\
| Size | Mean slippage | Fitted | Samples |\n\
|------|---------------|--------|---------|\n",
            );
            for point in stock.mean_curve.iter().take(10) {
                let fitted = match &stock.curve_fit {
                    Some(fit) => format!("{:.6e}", fit.predict(point.size)),
                    None => "-".to_string(),
                };
                report.push_str(&format!(
                    "| {:.0} | {:.6e} | {} | {} |\n",
                    point.size, point.mean_slippage, fitted, point.samples
                ));
            }
            if stock.mean_curve.len() > 10 {
                report.push_str(&format!(
                    "\n({} more sizes in {}_curve.csv)\n",
                    stock.mean_curve.len() - 10,
                    stock.ticker
                ));
            }
        }

        report.push_str(&format!(
            "\n### Allocation\n\n\
- Parent order: {:.2}\n\
- Predicted impact cost: {:.4}\n\
- Multiplier: {:.6e} ({} iterations, residual {:.2e})\n",
            stock.schedule.total_volume,
            stock.schedule.predicted_cost,
            stock.schedule.multiplier,
            stock.schedule.iterations,
            stock.schedule.residual,
        ));

        let mut ranked: Vec<(usize, f64)> = stock
            .schedule
            .quantities
            .iter()
            .copied()
            .enumerate()
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        report.push_str(
            "\n| Minute | Time | Quantity |\n\
|--------|------|----------|\n",
        );
        for (minute, quantity) in ranked.iter().filter(|(_, q)| *q > 0.0).take(5) {
            report.push_str(&format!(
                "| {} | {} | {:.4} |\n",
                minute,
                minute_label(*minute as u32),
                quantity
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_stock;
    use crate::config::AnalysisConfig;
    use crate::data_loader::DataSource;
    use crate::result::SCHEMA_VERSION;
    use impactlab_core::data::generate_synthetic_books;
    use std::collections::BTreeMap;

    #[test]
    fn report_contains_per_stock_sections() {
        let config = AnalysisConfig::default();
        let mut stocks = Vec::new();
        for ticker in ["AMZN", "MSFT"] {
            let snapshots = generate_synthetic_books(ticker, 30);
            stocks.push(
                analyze_stock(ticker, &snapshots, DataSource::Synthetic, 0, &config, false)
                    .unwrap(),
            );
        }
        let mut failures = BTreeMap::new();
        failures.insert("GOOG".to_string(), "Data file not found".to_string());

        let result = AnalysisResult {
            schema_version: SCHEMA_VERSION,
            run_id: "cafebabecafebabe".into(),
            created_at: chrono::Utc::now(),
            dataset_hash: "hash".into(),
            has_synthetic: true,
            stocks,
            failures,
        };

        let report = MarkdownReportGenerator.generate(&result);
        assert!(report.contains("# ImpactLab Run Report"));
        assert!(report.contains("`cafebabecafebabe`"));
        assert!(report.contains("## AMZN"));
        assert!(report.contains("## MSFT"));
        assert!(report.contains("### Fit Summary"));
        assert!(report.contains("### Allocation"));
        assert!(report.contains("## Failures"));
        assert!(report.contains("GOOG"));
        assert!(report.contains("synthetic books"));
    }
}
