//! Serializable analysis configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use impactlab_core::allocation::SolverSettings;
use impactlab_core::slippage::SizeGrid;

/// Unique identifier for an analysis run (content-addressable hash).
pub type RunId = String;

/// Configuration for a full analysis run.
///
/// Loadable from TOML; every section has defaults so a partial file (or no
/// file at all) yields a working configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Input data location and universe
    pub data: DataConfig,

    /// Order-size grid for curve construction
    pub grid: GridConfig,

    /// Per-snapshot fit acceptance
    pub fit: FitConfig,

    /// Parent order and solver settings
    pub allocation: AllocationConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            grid: GridConfig::default(),
            fit: FitConfig::default(),
            allocation: AllocationConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Loads and validates a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: AnalysisConfig = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value-level constraints the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.tickers.is_empty() {
            return Err(ConfigError::Invalid("tickers must not be empty".into()));
        }
        if !(self.grid.min > 0.0) {
            return Err(ConfigError::Invalid("grid.min must be positive".into()));
        }
        if self.grid.max <= self.grid.min {
            return Err(ConfigError::Invalid(
                "grid.max must exceed grid.min".into(),
            ));
        }
        if !(self.grid.step > 0.0) {
            return Err(ConfigError::Invalid("grid.step must be positive".into()));
        }
        if self.fit.min_points < 2 {
            return Err(ConfigError::Invalid(
                "fit.min_points must be at least 2".into(),
            ));
        }
        if !(self.allocation.total_volume > 0.0) {
            return Err(ConfigError::Invalid(
                "allocation.total_volume must be positive".into(),
            ));
        }
        if !(self.allocation.tolerance > 0.0) {
            return Err(ConfigError::Invalid(
                "allocation.tolerance must be positive".into(),
            ));
        }
        if self.allocation.max_iters == 0 {
            return Err(ConfigError::Invalid(
                "allocation.max_iters must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs share a RunId, so their artifact
    /// directories collide on purpose.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("AnalysisConfig serialization failed");
        let hash = blake3::hash(json.as_bytes());
        hash.to_hex()[..16].to_string()
    }

    pub fn size_grid(&self) -> SizeGrid {
        SizeGrid {
            min: self.grid.min,
            max: self.grid.max,
            step: self.grid.step,
        }
    }

    pub fn solver_settings(&self) -> SolverSettings {
        SolverSettings {
            alpha_floor: self.allocation.alpha_floor,
            tolerance: self.allocation.tolerance,
            max_iters: self.allocation.max_iters,
        }
    }
}

/// Input data location and universe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding `<TICKER>.csv` snapshot files
    pub data_dir: PathBuf,

    /// Tickers to analyze
    pub tickers: Vec<String>,

    /// Generate synthetic books for tickers whose file is missing
    pub allow_synthetic: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            tickers: vec!["AMZN".into(), "MSFT".into(), "GOOG".into()],
            allow_synthetic: false,
        }
    }
}

/// Order-size grid: min, min+step, ... strictly below max.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        let grid = SizeGrid::default();
        Self {
            min: grid.min,
            max: grid.max,
            step: grid.step,
        }
    }
}

/// Per-snapshot fit acceptance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FitConfig {
    /// Minimum feasible grid points for a snapshot fit to count
    pub min_points: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self { min_points: 2 }
    }
}

/// Parent order and solver settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AllocationConfig {
    /// Parent order size S to split across the session
    pub total_volume: f64,

    /// Lower clamp applied to fitted alphas before solving
    pub alpha_floor: f64,

    /// Relative budget tolerance for the multiplier bisection
    pub tolerance: f64,

    /// Iteration cap for the multiplier bisection
    pub max_iters: u32,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        let solver = SolverSettings::default();
        Self {
            total_volume: 5_000.0,
            alpha_floor: solver.alpha_floor,
            tolerance: solver.tolerance,
            max_iters: solver.max_iters,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
