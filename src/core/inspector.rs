use std::fs::Metadata;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::models::entry::EntryRecord;

use super::sink::{ErrorSink, ScanError, ScanErrorKind};

const HASH_BLOCK_SIZE: usize = 4096;

/// Stat a filesystem entry and normalize it into an [`EntryRecord`].
/// Stat failures are recorded into the sink and yield `None`; the
/// caller skips the entry. Symlinks are inspected as themselves and
/// never followed.
pub fn inspect(path: &Path, compute_hashes: bool, sink: &ErrorSink) -> Option<EntryRecord> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            sink.record_io(path, &e);
            return None;
        }
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());

    let (owner, group) = owner_group(&metadata);

    let mut record = EntryRecord {
        path: path.to_path_buf(),
        name: name.clone(),
        size: metadata.len(),
        is_dir: metadata.is_dir(),
        modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        permissions: format_mode(&metadata),
        owner,
        group,
        file_type: EntryRecord::type_tag(&name),
        md5: None,
    };

    if compute_hashes && metadata.is_file() && record.size > 0 {
        match hash_file(path) {
            Ok(digest) => record.md5 = Some(digest),
            Err(e) => sink.record(ScanError {
                path: path.to_path_buf(),
                kind: ScanErrorKind::HashFailed,
                message: e.to_string(),
            }),
        }
    }

    Some(record)
}

/// Stream the file through MD5 in fixed-size blocks.
fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut context = md5::Context::new();
    let mut block = [0u8; HASH_BLOCK_SIZE];
    loop {
        let read = file.read(&mut block)?;
        if read == 0 {
            break;
        }
        context.consume(&block[..read]);
    }
    Ok(format!("{:x}", context.compute()))
}

#[cfg(unix)]
fn owner_group(metadata: &Metadata) -> (String, String) {
    use std::os::unix::fs::MetadataExt;
    (metadata.uid().to_string(), metadata.gid().to_string())
}

#[cfg(not(unix))]
fn owner_group(_metadata: &Metadata) -> (String, String) {
    ("-".to_string(), "-".to_string())
}

/// `ls -l` style mode summary: type char plus rwx triplets.
#[cfg(unix)]
fn format_mode(metadata: &Metadata) -> String {
    use std::os::unix::fs::MetadataExt;

    let kind = if metadata.is_dir() {
        'd'
    } else if metadata.file_type().is_symlink() {
        'l'
    } else {
        '-'
    };

    let mode = metadata.mode();
    let mut out = String::with_capacity(10);
    out.push(kind);
    for shift in [6u32, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

#[cfg(not(unix))]
fn format_mode(metadata: &Metadata) -> String {
    let kind = if metadata.is_dir() { 'd' } else { '-' };
    let writable = if metadata.permissions().readonly() {
        "r--r--r--"
    } else {
        "rw-rw-rw-"
    };
    format!("{}{}", kind, writable)
}
