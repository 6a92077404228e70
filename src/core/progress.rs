use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Running totals for one engine instance, incremented once per entry
/// that survives filtering, whether file or directory. Reset only by
/// constructing a new engine.
#[derive(Debug, Default)]
pub struct ScanCounters {
    files_scanned: AtomicUsize,
    bytes_scanned: AtomicU64,
}

impl ScanCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_entry(&self, size: u64) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
        self.bytes_scanned.fetch_add(size, Ordering::Relaxed);
    }

    pub fn files_scanned(&self) -> usize {
        self.files_scanned.load(Ordering::Relaxed)
    }

    pub fn bytes_scanned(&self) -> u64 {
        self.bytes_scanned.load(Ordering::Relaxed)
    }
}
