//! ImpactLab CLI — analysis, fixture generation, and inspection commands.
//!
//! Commands:
//! - `analyze` — run the slippage/fit/allocation pipeline and export artifacts
//! - `synth` — write deterministic synthetic book days as CSV fixtures
//! - `inspect` — sanity-check one book CSV before analysis

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use impactlab_core::data::{generate_synthetic_books, write_csv, LobIngestor};
use impactlab_core::domain::{minute_label, MINUTES_PER_SESSION};
use impactlab_runner::reporting::ArtifactManager;
use impactlab_runner::{run_analysis_with, AnalysisConfig, AnalysisResult, DataSource};

#[derive(Parser)]
#[command(
    name = "impactlab",
    about = "ImpactLab CLI — limit-order-book impact analysis"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis pipeline and export artifacts.
    Analyze {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory holding per-ticker CSV book files. Overrides the config.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Comma-separated tickers (e.g. AMZN,MSFT,GOOG). Overrides the config.
        #[arg(long)]
        tickers: Option<String>,

        /// Parent order size to split across the session. Overrides the config.
        #[arg(long)]
        total_volume: Option<f64>,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "runs")]
        out: PathBuf,

        /// Generate synthetic books for tickers whose data file is missing.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Fit snapshots sequentially instead of in parallel.
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
    /// Write deterministic synthetic book days as CSV fixtures.
    Synth {
        /// Directory to write per-ticker CSV files into.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Comma-separated tickers.
        #[arg(long, default_value = "AMZN,MSFT,GOOG")]
        tickers: String,

        /// Snapshot rows per ticker.
        #[arg(long, default_value_t = MINUTES_PER_SESSION)]
        rows: u32,
    },
    /// Sanity-check one book CSV before analysis.
    Inspect {
        /// Path to a headerless 20-column book CSV file.
        #[arg(long)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            config,
            data_dir,
            tickers,
            total_volume,
            out,
            synthetic,
            sequential,
        } => run_analyze(
            config,
            data_dir,
            tickers,
            total_volume,
            out,
            synthetic,
            sequential,
        ),
        Commands::Synth {
            data_dir,
            tickers,
            rows,
        } => run_synth(&data_dir, &tickers, rows),
        Commands::Inspect { file } => run_inspect(&file),
    }
}

fn run_analyze(
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    tickers: Option<String>,
    total_volume: Option<f64>,
    out: PathBuf,
    synthetic: bool,
    sequential: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => AnalysisConfig::load(&path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(dir) = data_dir {
        config.data.data_dir = dir;
    }
    if let Some(raw) = tickers {
        config.data.tickers = split_tickers(&raw);
    }
    if let Some(volume) = total_volume {
        config.allocation.total_volume = volume;
    }
    if synthetic {
        config.data.allow_synthetic = true;
    }

    let result = run_analysis_with(&config, !sequential)?;
    print_summary(&result);

    let manager = ArtifactManager::new(&out)?;
    let paths = manager.save_run(&result)?;
    println!("Artifacts saved to: {}", paths.run_dir.display());

    Ok(())
}

fn run_synth(data_dir: &Path, tickers: &str, rows: u32) -> Result<()> {
    if rows == 0 {
        bail!("--rows must be at least 1");
    }
    let tickers = split_tickers(tickers);
    if tickers.is_empty() {
        bail!("--tickers must name at least one ticker");
    }

    std::fs::create_dir_all(data_dir)?;
    for ticker in &tickers {
        let books = generate_synthetic_books(ticker, rows);
        let path = data_dir.join(format!("{ticker}.csv"));
        write_csv(&path, &books)?;
        println!("Wrote {} rows to {}", books.len(), path.display());
    }
    Ok(())
}

fn run_inspect(file: &Path) -> Result<()> {
    let ingested = LobIngestor::new().load_csv(file)?;
    let snapshots = &ingested.snapshots;
    let n = snapshots.len() as f64;

    let spread_mean = snapshots
        .iter()
        .map(|s| s.best_ask() - s.best_bid())
        .sum::<f64>()
        / n;
    let depth_mean = snapshots.iter().map(|s| s.ask_depth()).sum::<f64>() / n;

    println!();
    println!("=== {} ===", file.display());
    println!(
        "Snapshots:      {} ({} rows skipped)",
        snapshots.len(),
        ingested.skipped_rows
    );
    if let (Some(first), Some(last)) = (snapshots.first(), snapshots.last()) {
        println!(
            "Session:        {} .. {} (mid {:.4} .. {:.4})",
            minute_label(first.minute),
            minute_label(last.minute),
            first.mid_price(),
            last.mid_price()
        );
    }
    println!("Spread (mean):  {spread_mean:.4}");
    println!("Depth (mean):   {depth_mean:.1} (ask side)");

    let expected = MINUTES_PER_SESSION as usize;
    if snapshots.len() + ingested.skipped_rows < expected {
        eprintln!(
            "WARNING: {} rows short of a full {}-minute session",
            expected - snapshots.len() - ingested.skipped_rows,
            expected
        );
    }
    Ok(())
}

fn split_tickers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn print_summary(result: &AnalysisResult) {
    println!();
    println!("=== Impact Analysis ===");
    println!("Run ID:         {}", result.run_id);
    println!(
        "Created:        {}",
        result
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
    );
    println!("Dataset hash:   {}", result.dataset_hash);
    println!(
        "Stocks:         {} analyzed, {} failed",
        result.stocks.len(),
        result.failures.len()
    );

    for stock in &result.stocks {
        let tag = match stock.source {
            DataSource::CsvFile => "csv",
            DataSource::Synthetic => "synthetic",
        };
        println!();
        println!("--- {} ({tag}) ---", stock.ticker);
        println!(
            "Snapshots:      {} ({} rows skipped)",
            stock.snapshot_count, stock.skipped_rows
        );
        println!(
            "Fits:           {} accepted, {} failed",
            stock.fits.len(),
            stock.fit_failures
        );
        println!("Infeasible:     {} grid points", stock.infeasible_points);
        println!("Delta (mean):   {:.4}", stock.delta_mean);
        if let Some(fit) = &stock.curve_fit {
            println!(
                "Average curve:  g(x) = {:.4e} * x^{:.4} (r-squared {:.3})",
                fit.alpha, fit.delta, fit.r_squared
            );
        }
        println!(
            "Schedule:       {:.2} over {} minutes, predicted cost {:.4}",
            stock.schedule.total_volume,
            stock.schedule.quantities.len(),
            stock.schedule.predicted_cost
        );
        if let Some((minute, quantity)) = peak_minute(&stock.schedule.quantities) {
            println!(
                "Peak minute:    {} (quantity {:.2})",
                minute_label(minute as u32),
                quantity
            );
        }
    }

    if result.has_synthetic {
        println!();
        println!("WARNING: Results include SYNTHETIC books");
    }
    for (ticker, reason) in &result.failures {
        println!("WARNING: {ticker}: {reason}");
    }
    println!();
}

fn peak_minute(quantities: &[f64]) -> Option<(usize, f64)> {
    quantities
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .filter(|(_, q)| *q > 0.0)
}
