use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use crate::models::stats::DirectoryStats;
use crate::models::summary::SummaryView;

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a SummaryView,
    timestamp: String,
    directory_tree: &'a DirectoryStats,
}

/// Write the analysis as pretty-printed JSON: the summary, an export
/// timestamp, and the full tree with nested children.
pub fn export_json(
    stats: &DirectoryStats,
    summary: &SummaryView,
    output_path: &Path,
) -> anyhow::Result<()> {
    let report = JsonReport {
        summary,
        timestamp: Utc::now().to_rfc3339(),
        directory_tree: stats,
    };
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(output_path, json)?;
    Ok(())
}
