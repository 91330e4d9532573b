//! JSON export and import of analysis results.
//!
//! All persisted results include a `schema_version` field. Unknown versions
//! are rejected on load.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::result::{AnalysisResult, SCHEMA_VERSION};

/// Serialize an `AnalysisResult` to pretty JSON.
pub fn export_json(result: &AnalysisResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize AnalysisResult to JSON")
}

/// Deserialize an `AnalysisResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisResult> {
    let result: AnalysisResult =
        serde_json::from_str(json).context("failed to deserialize AnalysisResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

/// Write an `AnalysisResult` as pretty JSON to `path`.
pub fn save_json(path: &Path, result: &AnalysisResult) -> Result<()> {
    let json = export_json(result)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// Load an `AnalysisResult` from a JSON file, rejecting unknown schema versions.
pub fn load_json(path: &Path) -> Result<AnalysisResult> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
