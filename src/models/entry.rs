use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel type tag for entries without a name suffix.
pub const NO_EXTENSION: &str = "no_extension";

/// Normalized record for a single filesystem entry. Immutable once
/// constructed by the inspector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRecord {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
    pub modified: Option<DateTime<Utc>>,
    pub permissions: String,
    pub owner: String,
    pub group: String,
    /// Lower-cased `.ext` suffix, or [`NO_EXTENSION`].
    pub file_type: String,
    /// Streaming content digest; only present when hashing is enabled
    /// and the entry is a non-empty regular file.
    pub md5: Option<String>,
}

impl EntryRecord {
    /// Derive the normalized type tag from a base name: the lower-cased
    /// suffix after the last dot, including the dot. A leading dot alone
    /// (hidden files) or a trailing dot does not count as a suffix.
    pub fn type_tag(name: &str) -> String {
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
                format!(".{}", ext.to_lowercase())
            }
            _ => NO_EXTENSION.to_string(),
        }
    }
}
