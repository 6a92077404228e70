use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::config::settings::AnalyzerSettings;
use crate::models::entry::EntryRecord;
use crate::models::stats::DirectoryStats;
use crate::models::summary::SummaryView;

use super::filter::PathFilter;
use super::inspector;
use super::progress::ScanCounters;
use super::sink::{ErrorSink, ScanError, ScanErrorKind};

/// Fatal analysis errors. Everything else encountered during a walk is
/// recorded in the [`ErrorSink`] and the walk continues.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("directory not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Traversal and aggregation engine. Holds no state between calls other
/// than the scan counters and the error sink, both reset only by
/// constructing a new instance.
pub struct DiskAnalyzer {
    settings: Arc<AnalyzerSettings>,
    filter: Arc<PathFilter>,
    semaphore: Arc<Semaphore>,
    counters: Arc<ScanCounters>,
    errors: Arc<ErrorSink>,
}

impl DiskAnalyzer {
    /// Build an engine from settings; exclusion patterns are compiled
    /// here, so an invalid glob fails construction rather than the walk.
    pub fn new(settings: AnalyzerSettings) -> anyhow::Result<Self> {
        let filter = PathFilter::new(settings.include_hidden, &settings.exclude_patterns)?;
        let max_io = settings.max_concurrent_io.max(1);
        Ok(Self {
            settings: Arc::new(settings),
            filter: Arc::new(filter),
            semaphore: Arc::new(Semaphore::new(max_io)),
            counters: Arc::new(ScanCounters::new()),
            errors: Arc::new(ErrorSink::new()),
        })
    }

    pub fn counters(&self) -> &ScanCounters {
        &self.counters
    }

    pub fn errors(&self) -> &ErrorSink {
        &self.errors
    }

    /// Walk `root` depth-first and aggregate per-directory statistics.
    ///
    /// Fails fast with [`AnalyzeError::NotFound`] /
    /// [`AnalyzeError::NotADirectory`] on an invalid root; any access
    /// failure below the root is recorded in the sink and skipped.
    pub async fn analyze(&self, root: impl AsRef<Path>) -> anyhow::Result<DirectoryStats> {
        let root = root.as_ref();

        let metadata = match std::fs::metadata(root) {
            Ok(meta) => meta,
            Err(_) => return Err(AnalyzeError::NotFound(root.to_path_buf()).into()),
        };
        if !metadata.is_dir() {
            return Err(AnalyzeError::NotADirectory(root.to_path_buf()).into());
        }

        tracing::info!(path = %root.display(), "starting analysis");

        let stats = walk_directory(
            root.to_path_buf(),
            0,
            Arc::clone(&self.settings),
            Arc::clone(&self.filter),
            Arc::clone(&self.semaphore),
            Arc::clone(&self.counters),
            Arc::clone(&self.errors),
        )
        .await?;

        tracing::info!(
            files = stats.file_count,
            dirs = stats.dir_count,
            total_size = stats.total_size,
            errors = self.errors.len(),
            "analysis complete"
        );

        Ok(stats)
    }

    /// Project a built tree plus this engine's counters into the flat
    /// reporting view.
    pub fn summary(&self, stats: &DirectoryStats) -> SummaryView {
        SummaryView::build(
            stats,
            self.counters.files_scanned(),
            self.counters.bytes_scanned(),
            self.errors.len(),
        )
    }
}

/// Collect every node's `largest_file` at or above `threshold`, sorted
/// descending by size. Retains at most one candidate per directory
/// node, so a directory holding several qualifying files surfaces only
/// its largest.
pub fn find_large_files(stats: &DirectoryStats, threshold: u64) -> Vec<EntryRecord> {
    let mut found = Vec::new();
    collect_large_files(stats, threshold, &mut found);
    found.sort_by(|a, b| b.size.cmp(&a.size));
    found
}

fn collect_large_files(stats: &DirectoryStats, threshold: u64, out: &mut Vec<EntryRecord>) {
    if let Some(largest) = &stats.largest_file {
        if largest.size >= threshold {
            out.push(largest.clone());
        }
    }
    for child in &stats.children {
        collect_large_files(child, threshold, out);
    }
}

/// A listed entry waiting to be folded into its parent.
enum Pending {
    File(EntryRecord),
    /// `walk` is `None` when the directory sits at the depth cap: it is
    /// still counted but contributes no size, files, types, or children.
    Directory {
        path: PathBuf,
        walk: Option<JoinHandle<anyhow::Result<DirectoryStats>>>,
    },
}

/// List a directory and inspect every non-excluded entry in one
/// blocking call. Returns `Err` only when the directory itself cannot
/// be listed; per-entry failures go to the sink.
fn read_dir_batch(
    dir_path: &Path,
    filter: &PathFilter,
    compute_hashes: bool,
    sink: &ErrorSink,
) -> std::io::Result<Vec<EntryRecord>> {
    let mut records = Vec::new();

    for entry_result in std::fs::read_dir(dir_path)? {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                sink.record_io(dir_path, &e);
                continue;
            }
        };
        let entry_path = entry.path();
        if filter.is_excluded(&entry_path) {
            continue;
        }
        if let Some(record) = inspector::inspect(&entry_path, compute_hashes, sink) {
            records.push(record);
        }
    }

    Ok(records)
}

fn walk_directory(
    path: PathBuf,
    depth: usize,
    settings: Arc<AnalyzerSettings>,
    filter: Arc<PathFilter>,
    semaphore: Arc<Semaphore>,
    counters: Arc<ScanCounters>,
    errors: Arc<ErrorSink>,
) -> Pin<Box<dyn Future<Output = anyhow::Result<DirectoryStats>> + Send>> {
    Box::pin(async move {
        let mut stats = DirectoryStats::new(path.clone());

        // Batch I/O: list the directory and stat every entry in a single
        // spawn_blocking call. The semaphore permit is held only during
        // the I/O, then released before folding or waiting on children.
        let io_result = {
            let _permit = semaphore.acquire().await?;
            let batch_path = path.clone();
            let batch_filter = Arc::clone(&filter);
            let batch_errors = Arc::clone(&errors);
            let compute_hashes = settings.compute_hashes;
            tokio::task::spawn_blocking(move || {
                read_dir_batch(&batch_path, &batch_filter, compute_hashes, &batch_errors)
            })
            .await?
        };

        let records = match io_result {
            Ok(records) => records,
            Err(e) => {
                // Listing failed: report the node with whatever was
                // accumulated and keep walking elsewhere.
                tracing::warn!(path = %path.display(), error = %e, "directory listing failed");
                errors.record_io(&path, &e);
                return Ok(stats);
            }
        };

        let mut pending = Vec::with_capacity(records.len());

        for record in records {
            // The size filter compares the entry's own stat size, for
            // directories as well as files.
            if record.size < settings.min_size {
                continue;
            }
            counters.record_entry(record.size);

            if record.is_dir {
                let walk = if depth < settings.max_depth {
                    Some(tokio::spawn(walk_directory(
                        record.path.clone(),
                        depth + 1,
                        Arc::clone(&settings),
                        Arc::clone(&filter),
                        Arc::clone(&semaphore),
                        Arc::clone(&counters),
                        Arc::clone(&errors),
                    )))
                } else {
                    None
                };
                pending.push(Pending::Directory {
                    path: record.path,
                    walk,
                });
            } else {
                pending.push(Pending::File(record));
            }
        }

        // Fold in listing order: sibling walks run concurrently above,
        // but aggregate totals and largest-file tie-breaks stay
        // deterministic for a given directory listing.
        for item in pending {
            match item {
                Pending::File(record) => stats.fold_file(record),
                Pending::Directory {
                    path: child_path,
                    walk,
                } => {
                    stats.dir_count += 1;
                    let Some(handle) = walk else {
                        continue;
                    };
                    match handle.await {
                        Ok(Ok(child)) => stats.fold_child(child),
                        Ok(Err(e)) => errors.record(ScanError {
                            path: child_path,
                            kind: ScanErrorKind::Other,
                            message: e.to_string(),
                        }),
                        Err(e) => errors.record(ScanError {
                            path: child_path,
                            kind: ScanErrorKind::Other,
                            message: format!("task join error: {}", e),
                        }),
                    }
                }
            }
        }

        Ok(stats)
    })
}
