//! JSON report of a batch, one entry per input URL.

use std::path::Path;

use serde::Serialize;

use imgdl_core::BatchResult;

use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ReportEntry<'a> {
    url: &'a str,
    path: Option<&'a Path>,
    error: Option<String>,
}

fn entries(result: &BatchResult) -> Vec<ReportEntry<'_>> {
    result
        .entries()
        .iter()
        .map(|entry| ReportEntry {
            url: &entry.url,
            path: entry.outcome.path(),
            error: entry.outcome.error().map(ToString::to_string),
        })
        .collect()
}

/// Render the report as pretty-printed JSON.
pub fn render(result: &BatchResult) -> Result<String, CliError> {
    serde_json::to_string_pretty(&entries(result))
        .map_err(|e| CliError::Io(format!("cannot serialize report: {e}")))
}

/// Write the report to `path`, replacing any existing file.
pub async fn write(path: &Path, result: &BatchResult) -> Result<(), CliError> {
    let json = render(result)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| CliError::Io(format!("cannot write report {}: {e}", path.display())))
}
