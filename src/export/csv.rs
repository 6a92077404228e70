use std::fmt::Write;
use std::path::Path;

use crate::models::stats::{human_readable_size, DirectoryStats};

/// Write one row per directory node, depth-first, flattening the tree
/// into `Path,Size_Bytes,Size_Human,Files,Directories`.
pub fn export_csv(stats: &DirectoryStats, output_path: &Path) -> anyhow::Result<()> {
    let mut out = String::new();
    writeln!(out, "Path,Size_Bytes,Size_Human,Files,Directories")?;
    write_directory(&mut out, stats)?;
    std::fs::write(output_path, out)?;
    Ok(())
}

fn write_directory(out: &mut String, stats: &DirectoryStats) -> std::fmt::Result {
    writeln!(
        out,
        "{},{},{},{},{}",
        quote(&stats.path.to_string_lossy()),
        stats.total_size,
        human_readable_size(stats.total_size),
        stats.file_count,
        stats.dir_count,
    )?;
    for child in &stats.children {
        write_directory(out, child)?;
    }
    Ok(())
}

/// Quote a field when it contains a delimiter, quote, or newline.
fn quote(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
