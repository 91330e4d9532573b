//! Run manifest export (JSON).

use anyhow::{Context, Result};
use std::path::Path;

use crate::reporting::export::export_json;
use crate::result::AnalysisResult;

/// Writes the full result as `manifest.json`. Atomic: write to .tmp, rename.
pub fn write_manifest(path: &Path, result: &AnalysisResult) -> Result<()> {
    let json = export_json(result)?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json)
        .with_context(|| format!("Failed to write manifest to {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        anyhow::anyhow!("atomic rename failed for {}: {e}", path.display())
    })?;
    Ok(())
}
