use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{info, warn};

use crate::error::ReportError;
use crate::probe::ProbeResult;

const EXPORT_FILE_PREFIX: &str = "url-check-results-";

/// Export destinations requested by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTargets {
    pub json: Option<String>,
    pub jsonl: Option<String>,
}

impl ExportTargets {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.json.is_none() && self.jsonl.is_none()
    }
}

/// `url-check-results-<YYYY-MM-DDTHH-MM-SS>.<extension>`
#[must_use]
pub fn default_export_file_name(now: DateTime<Utc>, extension: &str) -> String {
    format!(
        "{}{}.{}",
        EXPORT_FILE_PREFIX,
        now.format("%Y-%m-%dT%H-%M-%S"),
        extension
    )
}

/// An existing directory gets a timestamped file name; anything else is used as-is.
#[must_use]
pub fn resolve_export_path(path: &str, extension: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_dir() {
        return path.join(default_export_file_name(Utc::now(), extension));
    }
    path
}

/// Writes every requested export and returns the paths written.
///
/// Nothing is written when there are no results.
///
/// # Errors
///
/// Returns an error when serialization or writing fails.
pub async fn write_exports(
    targets: &ExportTargets,
    results: &[ProbeResult],
) -> Result<Vec<PathBuf>, ReportError> {
    if targets.is_empty() {
        return Ok(Vec::new());
    }
    if results.is_empty() {
        warn!("No results to export.");
        return Ok(Vec::new());
    }

    let mut written = Vec::new();
    if let Some(path) = targets.json.as_deref() {
        let path = resolve_export_path(path, "json");
        export_json(&path, results).await?;
        info!("Exported {} result(s) to {}", results.len(), path.display());
        written.push(path);
    }
    if let Some(path) = targets.jsonl.as_deref() {
        let path = resolve_export_path(path, "jsonl");
        export_jsonl(&path, results).await?;
        info!("Exported {} result(s) to {}", results.len(), path.display());
        written.push(path);
    }
    Ok(written)
}

/// Writes `{ "results": [...] }`, pretty-printed.
///
/// # Errors
///
/// Returns an error when serialization or writing fails.
pub async fn export_json(path: &Path, results: &[ProbeResult]) -> Result<(), ReportError> {
    let payload = serde_json::json!({ "results": results });
    let json =
        serde_json::to_vec_pretty(&payload).map_err(|err| ReportError::Serialize { source: err })?;
    write_file(path, &[json.as_slice()]).await
}

/// Writes one serialized result per line.
///
/// # Errors
///
/// Returns an error when serialization or writing fails.
pub async fn export_jsonl(path: &Path, results: &[ProbeResult]) -> Result<(), ReportError> {
    let mut lines = Vec::with_capacity(results.len());
    for result in results {
        let mut line =
            serde_json::to_vec(result).map_err(|err| ReportError::Serialize { source: err })?;
        line.push(b'\n');
        lines.push(line);
    }
    let chunks: Vec<&[u8]> = lines.iter().map(Vec::as_slice).collect();
    write_file(path, &chunks).await
}

async fn write_file(path: &Path, chunks: &[&[u8]]) -> Result<(), ReportError> {
    let write_error = |err: std::io::Error| ReportError::WriteExport {
        path: path.to_path_buf(),
        source: err,
    };
    let file = tokio::fs::File::create(path).await.map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    for chunk in chunks {
        writer.write_all(chunk).await.map_err(write_error)?;
    }
    writer.flush().await.map_err(write_error)?;
    Ok(())
}
