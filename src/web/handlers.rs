use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::config::settings::AnalyzerSettings;
use crate::config::size::parse_size;
use crate::core::analyzer::DiskAnalyzer;
use crate::models::summary::SummaryView;

use super::cache::{CacheKey, ResponseCache, CACHE_TTL};
use super::charts::{self, LargeFileView, PieChartData, TreeNodeView, TreemapData};

/// Exclusions always applied by the web analyzer.
const WEB_EXCLUDE_PATTERNS: [&str; 4] = ["*.tmp", ".git", "__pycache__", "*.pyc"];

/// How many sink entries are surfaced in a response.
const ERROR_LIMIT: usize = 10;

const DIRECTORY_LIST_LIMIT: usize = 20;

/// Shared state behind every handler.
pub struct ApiState {
    pub cache: ResponseCache<AnalyzeResponse>,
}

impl ApiState {
    pub fn new() -> Self {
        Self {
            cache: ResponseCache::new(CACHE_TTL),
        }
    }
}

impl Default for ApiState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_min_size")]
    pub min_size: String,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub include_hidden: bool,
}

fn default_path() -> String {
    "/home".to_string()
}

fn default_min_size() -> String {
    "0B".to_string()
}

fn default_max_depth() -> usize {
    5
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub summary: SummaryView,
    pub tree_data: Vec<TreeNodeView>,
    pub pie_chart: PieChartData,
    pub treemap_data: TreemapData,
    pub large_files: Vec<LargeFileView>,
    pub file_types: HashMap<String, usize>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "dirstat-web",
    }))
}

/// Run (or replay from cache) an analysis and shape the response for
/// the browser client.
pub async fn analyze(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, HandlerError> {
    tracing::debug!(path = %request.path, "analyze request");

    let min_size = parse_size(&request.min_size).unwrap_or(0);

    if !Path::new(&request.path).exists() {
        return Err(bad_request(format!(
            "directory not found: {}",
            request.path
        )));
    }

    let key = CacheKey {
        path: request.path.clone(),
        min_size,
        max_depth: request.max_depth,
        include_hidden: request.include_hidden,
    };
    if let Some(cached) = state.cache.get(&key) {
        tracing::debug!(path = %request.path, "cache hit");
        return Ok(Json(cached));
    }

    let settings = AnalyzerSettings {
        min_size,
        max_depth: request.max_depth,
        include_hidden: request.include_hidden,
        exclude_patterns: WEB_EXCLUDE_PATTERNS.iter().map(|p| p.to_string()).collect(),
        ..AnalyzerSettings::default()
    };

    let analyzer = DiskAnalyzer::new(settings).map_err(internal_error)?;
    let stats = analyzer
        .analyze(&request.path)
        .await
        .map_err(internal_error)?;
    let summary = analyzer.summary(&stats);

    let response = AnalyzeResponse {
        tree_data: charts::tree_data(&stats),
        pie_chart: charts::pie_chart_data(&stats),
        treemap_data: charts::treemap_data(&stats),
        large_files: charts::large_files_data(&stats, min_size.saturating_mul(10)),
        file_types: summary.file_types.clone(),
        errors: analyzer
            .errors()
            .snapshot()
            .iter()
            .take(ERROR_LIMIT)
            .map(|e| e.to_string())
            .collect(),
        summary,
    };

    state.cache.insert(key, response.clone());
    Ok(Json(response))
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryEntry {
    pub path: String,
    pub name: String,
    pub readable: bool,
}

#[derive(Debug, Serialize)]
pub struct DirectoriesResponse {
    pub directories: Vec<DirectoryEntry>,
    pub common: Vec<DirectoryEntry>,
}

const BASE_PATHS: [&str; 5] = ["/home", "/var", "/usr", "/opt", "/tmp"];

/// Offer readable starting points for the browser's path picker.
pub async fn list_directories() -> Json<DirectoriesResponse> {
    let mut directories = Vec::new();

    'bases: for base in BASE_PATHS {
        let Ok(mut entries) = tokio::fs::read_dir(base).await else {
            continue;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            if directories.len() >= DIRECTORY_LIST_LIMIT {
                break 'bases;
            }
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }
            directories.push(DirectoryEntry {
                path: entry.path().to_string_lossy().to_string(),
                name: format!("{}/{}", base, entry.file_name().to_string_lossy()),
                readable: true,
            });
        }
    }

    let common = vec![
        DirectoryEntry {
            path: "/home".to_string(),
            name: "/home (user directories)".to_string(),
            readable: true,
        },
        DirectoryEntry {
            path: "/var/log".to_string(),
            name: "/var/log (system logs)".to_string(),
            readable: true,
        },
        DirectoryEntry {
            path: "/usr".to_string(),
            name: "/usr (system programs)".to_string(),
            readable: true,
        },
    ];

    Json(DirectoriesResponse {
        directories,
        common,
    })
}

fn bad_request(message: String) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: message }),
    )
}

fn internal_error(err: impl std::fmt::Display) -> HandlerError {
    tracing::error!(error = %err, "analysis failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}
