//! Chart-data shaping for the browser client. Every function here is a
//! pure transform over a built stats tree.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::analyzer::find_large_files;
use crate::models::stats::{human_readable_size, DirectoryStats};

const TREE_MAX_DEPTH: usize = 3;
const TREE_TOP_CHILDREN: usize = 10;
const PIE_TOP_CHILDREN: usize = 10;
const TREEMAP_TOP_CHILDREN: usize = 8;
const LARGE_FILES_LIMIT: usize = 20;

const PIE_PALETTE: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
    "#BB8FCE", "#85C1E9",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNodeView {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub size_human: String,
    pub file_count: usize,
    pub dir_count: usize,
    pub children: Vec<TreeNodeView>,
}

/// Nested tree for the browser tree widget: three levels deep, the ten
/// largest children per level.
pub fn tree_data(stats: &DirectoryStats) -> Vec<TreeNodeView> {
    vec![build_tree_node(stats, 0)]
}

fn build_tree_node(stats: &DirectoryStats, depth: usize) -> TreeNodeView {
    let mut node = TreeNodeView {
        name: stats.name(),
        path: stats.path.clone(),
        size: stats.total_size,
        size_human: human_readable_size(stats.total_size),
        file_count: stats.file_count,
        dir_count: stats.dir_count,
        children: Vec::new(),
    };

    if depth < TREE_MAX_DEPTH {
        for child in largest_children(stats, TREE_TOP_CHILDREN) {
            node.children.push(build_tree_node(child, depth + 1));
        }
    }
    node
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PieChartData {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub colors: Vec<String>,
}

/// Pie slices for the root's ten largest children, palette colors
/// assigned in order.
pub fn pie_chart_data(stats: &DirectoryStats) -> PieChartData {
    let mut data = PieChartData::default();
    for (i, child) in largest_children(stats, PIE_TOP_CHILDREN).into_iter().enumerate() {
        data.labels.push(format!(
            "{}\n({})",
            child.name(),
            human_readable_size(child.total_size)
        ));
        data.values.push(child.total_size);
        data.colors.push(PIE_PALETTE[i % PIE_PALETTE.len()].to_string());
    }
    data
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreemapData {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub parents: Vec<String>,
}

/// Flattened label/value/parent triples, eight largest children per
/// level, labels accumulated as slash-joined paths from the root.
pub fn treemap_data(stats: &DirectoryStats) -> TreemapData {
    let mut data = TreemapData::default();
    add_treemap_node(stats, "", &mut data);
    data
}

fn add_treemap_node(stats: &DirectoryStats, parent: &str, data: &mut TreemapData) {
    let current = match stats.path.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => "root".to_string(),
    };
    let label = if parent.is_empty() {
        current
    } else {
        format!("{}/{}", parent, current)
    };

    data.labels.push(label.clone());
    data.values.push(stats.total_size);
    data.parents.push(parent.to_string());

    for child in largest_children(stats, TREEMAP_TOP_CHILDREN) {
        add_treemap_node(child, &label, data);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LargeFileView {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub size_human: String,
    pub modified: Option<String>,
}

/// Large-file listing for the browser: the per-node largest files at or
/// above `threshold`, twenty largest overall.
pub fn large_files_data(stats: &DirectoryStats, threshold: u64) -> Vec<LargeFileView> {
    find_large_files(stats, threshold)
        .into_iter()
        .take(LARGE_FILES_LIMIT)
        .map(|record| LargeFileView {
            name: record.name,
            size: record.size,
            size_human: human_readable_size(record.size),
            modified: record.modified.map(|m| m.to_rfc3339()),
            path: record.path,
        })
        .collect()
}

fn largest_children(stats: &DirectoryStats, limit: usize) -> Vec<&DirectoryStats> {
    let mut children: Vec<&DirectoryStats> = stats.children.iter().collect();
    children.sort_by(|a, b| b.total_size.cmp(&a.total_size));
    children.truncate(limit);
    children
}
