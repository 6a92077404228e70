use serde::{Deserialize, Serialize};

/// Engine construction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerSettings {
    /// Minimum entry size in bytes; smaller entries are skipped. The
    /// comparison uses the entry's own stat size, directories included.
    pub min_size: u64,
    /// Maximum recursion depth. Directories at the cap are counted but
    /// not descended into.
    pub max_depth: usize,
    /// Shell-glob patterns tested against entry names and paths.
    pub exclude_patterns: Vec<String>,
    /// Include entries whose name starts with a dot.
    pub include_hidden: bool,
    /// Compute a streaming MD5 digest for regular files.
    pub compute_hashes: bool,
    /// Upper bound on concurrent blocking filesystem operations.
    pub max_concurrent_io: usize,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            min_size: 0,
            max_depth: 10,
            exclude_patterns: vec![],
            include_hidden: false,
            compute_hashes: false,
            max_concurrent_io: cap_by_fd_limit(64),
        }
    }
}

/// Cap concurrency based on the system's file descriptor soft limit.
/// Reserves 25% of fds for non-scan use (stdio, sockets, channels).
fn cap_by_fd_limit(max_io: usize) -> usize {
    #[cfg(unix)]
    {
        let mut rlim = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        let ret = unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut rlim) };
        if ret == 0 && rlim.rlim_cur != libc::RLIM_INFINITY {
            let fd_limit = rlim.rlim_cur as usize;
            let usable = fd_limit * 3 / 4; // reserve 25%
            return max_io.min(usable).max(16); // at least 16
        }
    }
    max_io
}
