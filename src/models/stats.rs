use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::entry::EntryRecord;

/// Aggregate statistics for one directory subtree. Forms a tree rooted
/// at the scan path; owned exclusively by the walk that built it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryStats {
    pub path: PathBuf,
    /// Bytes of all descendant files in the filtered set.
    pub total_size: u64,
    /// Cumulative file count over the whole subtree.
    pub file_count: usize,
    /// Cumulative directory count over the whole subtree, excluding
    /// this node itself.
    pub dir_count: usize,
    /// The single largest file anywhere in the subtree. `None` iff the
    /// filtered subtree contains no files.
    pub largest_file: Option<EntryRecord>,
    /// Type tag -> occurrence count, merged from all descendants.
    /// Directories are never counted here.
    pub file_types: HashMap<String, usize>,
    /// One node per non-excluded, non-depth-capped subdirectory, in
    /// traversal order.
    pub children: Vec<DirectoryStats>,
}

impl DirectoryStats {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            total_size: 0,
            file_count: 0,
            dir_count: 0,
            largest_file: None,
            file_types: HashMap::new(),
            children: Vec::new(),
        }
    }

    /// Fold a direct file entry into this node's aggregates.
    pub fn fold_file(&mut self, record: EntryRecord) {
        self.file_count += 1;
        self.total_size += record.size;
        *self
            .file_types
            .entry(record.file_type.clone())
            .or_insert(0) += 1;
        self.replace_largest(&record);
    }

    /// Fold a fully-built child directory into this node's aggregates
    /// and adopt it as a child. The caller accounts for the child's own
    /// directory increment; this adds the child's cumulative counts.
    pub fn fold_child(&mut self, child: DirectoryStats) {
        self.total_size += child.total_size;
        self.file_count += child.file_count;
        self.dir_count += child.dir_count;
        for (tag, count) in &child.file_types {
            *self.file_types.entry(tag.clone()).or_insert(0) += count;
        }
        if let Some(candidate) = &child.largest_file {
            self.replace_largest(candidate);
        }
        self.children.push(child);
    }

    /// Strict greater-than replacement: on equal sizes the first-seen
    /// holder is kept.
    fn replace_largest(&mut self, candidate: &EntryRecord) {
        let wins = match &self.largest_file {
            Some(current) => candidate.size > current.size,
            None => true,
        };
        if wins {
            self.largest_file = Some(candidate.clone());
        }
    }

    /// Base name of this node's path, falling back to the full path for
    /// roots like `/`.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }

    pub fn percentage(&self, total_size: u64) -> f64 {
        if total_size == 0 {
            return 0.0;
        }
        (self.total_size as f64 / total_size as f64) * 100.0
    }
}

pub fn human_readable_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;
    const TB: u64 = 1024 * GB;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
