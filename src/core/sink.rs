use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanErrorKind {
    PermissionDenied,
    NotFound,
    HashFailed,
    Io,
    Other,
}

/// A non-fatal access failure encountered during a walk: the offending
/// path plus the underlying cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanError {
    pub path: PathBuf,
    pub kind: ScanErrorKind,
    pub message: String,
}

impl ScanError {
    pub fn from_io(path: &Path, err: &std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::PermissionDenied => ScanErrorKind::PermissionDenied,
            std::io::ErrorKind::NotFound => ScanErrorKind::NotFound,
            _ => ScanErrorKind::Io,
        };
        Self {
            path: path.to_path_buf(),
            kind,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Append-only accumulator of non-fatal scan errors, shared across walk
/// tasks. Never aborts the walk; read by callers after `analyze`
/// completes. Cleared only by constructing a new engine.
#[derive(Debug, Default)]
pub struct ErrorSink {
    errors: Mutex<Vec<ScanError>>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, error: ScanError) {
        tracing::debug!(path = %error.path.display(), message = %error.message, "scan error");
        self.errors.lock().unwrap().push(error);
    }

    pub fn record_io(&self, path: &Path, err: &std::io::Error) {
        self.record(ScanError::from_io(path, err));
    }

    pub fn len(&self) -> usize {
        self.errors.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<ScanError> {
        self.errors.lock().unwrap().clone()
    }
}
