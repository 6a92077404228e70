use std::io::Write;

use termcolor::{Color, ColorSpec, StandardStream, WriteColor};

use crate::core::sink::ScanError;
use crate::models::entry::{EntryRecord, NO_EXTENSION};
use crate::models::stats::human_readable_size;
use crate::models::summary::SummaryView;

const FILE_TYPE_LIMIT: usize = 15;
const LARGE_FILES_LIMIT: usize = 20;

/// How many errors are shown in full before the report switches to a
/// truncated head plus a count.
const ERROR_DETAIL_LIMIT: usize = 5;

pub fn print_summary(out: &mut StandardStream, summary: &SummaryView) -> anyhow::Result<()> {
    section_title(out, "Analysis Summary")?;

    metric(out, "Directory", &summary.path.display().to_string())?;
    metric(out, "Total size", &summary.total_size_human)?;
    metric(out, "Files", &summary.file_count.to_string())?;
    metric(out, "Directories", &summary.dir_count.to_string())?;

    if let Some(largest) = &summary.largest_file {
        let name = largest
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| largest.path.display().to_string());
        metric(
            out,
            "Largest file",
            &format!("{} ({})", name, largest.size_human),
        )?;
    }

    metric(out, "Entries scanned", &summary.files_scanned.to_string())?;
    metric(out, "Bytes scanned", &summary.bytes_scanned_human)?;

    if summary.error_count > 0 {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        writeln!(out, "  {:<16} {}", "Errors", summary.error_count)?;
        out.reset()?;
    }

    writeln!(out)?;
    Ok(())
}

pub fn print_file_types(out: &mut StandardStream, summary: &SummaryView) -> anyhow::Result<()> {
    if summary.file_types.is_empty() {
        return Ok(());
    }

    let total: usize = summary.file_types.values().sum();

    section_title(out, "File Types")?;
    for (tag, count) in summary.top_file_types(FILE_TYPE_LIMIT) {
        let display = if tag == NO_EXTENSION {
            "(no extension)".to_string()
        } else {
            tag
        };
        let percentage = (count as f64 / total as f64) * 100.0;
        writeln!(out, "  {:<16} {:>8}  {:>5.1}%", display, count, percentage)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Numbered large-file listing, largest first, capped at twenty rows.
pub fn print_large_files(
    out: &mut StandardStream,
    files: &[EntryRecord],
    threshold_display: &str,
) -> anyhow::Result<()> {
    if files.is_empty() {
        writeln!(out, "No files larger than {} found.", threshold_display)?;
        writeln!(out)?;
        return Ok(());
    }

    section_title(out, &format!("Files larger than {}", threshold_display))?;
    for (i, record) in files.iter().take(LARGE_FILES_LIMIT).enumerate() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(out, "{:>3}. {:>10}", i + 1, human_readable_size(record.size))?;
        out.reset()?;
        writeln!(out, "  {}", record.path.display())?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn print_errors(out: &mut StandardStream, errors: &[ScanError]) -> anyhow::Result<()> {
    if errors.is_empty() {
        return Ok(());
    }

    out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
    writeln!(out, "{} error(s) encountered during the scan", errors.len())?;
    out.reset()?;

    if errors.len() <= ERROR_DETAIL_LIMIT {
        for error in errors {
            writeln!(out, "  - {}", error)?;
        }
    } else {
        for error in &errors[..3] {
            writeln!(out, "  - {}", error)?;
        }
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        writeln!(out, "  ... and {} more", errors.len() - 3)?;
        out.reset()?;
    }
    Ok(())
}

fn section_title(out: &mut StandardStream, title: &str) -> anyhow::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
    writeln!(out, "{}", title)?;
    out.reset()?;
    Ok(())
}

fn metric(out: &mut StandardStream, label: &str, value: &str) -> anyhow::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
    write!(out, "  {:<16} ", label)?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    writeln!(out, "{}", value)?;
    out.reset()?;
    Ok(())
}
