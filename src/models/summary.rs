use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::stats::{human_readable_size, DirectoryStats};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LargestFileView {
    pub path: PathBuf,
    pub size: u64,
    pub size_human: String,
}

/// Flat reporting projection of a built stats tree plus the engine's
/// scan counters. Pure transform; no filesystem access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryView {
    pub path: PathBuf,
    pub total_size: u64,
    pub total_size_human: String,
    pub file_count: usize,
    pub dir_count: usize,
    pub largest_file: Option<LargestFileView>,
    pub file_types: HashMap<String, usize>,
    pub files_scanned: usize,
    pub bytes_scanned: u64,
    pub bytes_scanned_human: String,
    pub error_count: usize,
}

impl SummaryView {
    pub fn build(
        stats: &DirectoryStats,
        files_scanned: usize,
        bytes_scanned: u64,
        error_count: usize,
    ) -> Self {
        Self {
            path: stats.path.clone(),
            total_size: stats.total_size,
            total_size_human: human_readable_size(stats.total_size),
            file_count: stats.file_count,
            dir_count: stats.dir_count,
            largest_file: stats.largest_file.as_ref().map(|f| LargestFileView {
                path: f.path.clone(),
                size: f.size,
                size_human: human_readable_size(f.size),
            }),
            file_types: stats.file_types.clone(),
            files_scanned,
            bytes_scanned,
            bytes_scanned_human: human_readable_size(bytes_scanned),
            error_count,
        }
    }

    /// File types sorted by count descending (name ascending on ties),
    /// truncated to `limit` entries.
    pub fn top_file_types(&self, limit: usize) -> Vec<(String, usize)> {
        let mut sorted: Vec<(String, usize)> = self
            .file_types
            .iter()
            .map(|(tag, count)| (tag.clone(), *count))
            .collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sorted.truncate(limit);
        sorted
    }
}
