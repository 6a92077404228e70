use std::io::Write;

use termcolor::{Color, ColorSpec, StandardStream, WriteColor};

use crate::models::stats::{human_readable_size, DirectoryStats};

/// Levels shown below the root; deeper directories exist in the tree
/// but are not rendered.
const MAX_VISUAL_DEPTH: usize = 3;

/// Print the directory tree, largest children first, limited to
/// `max_items` entries per level.
pub fn print_tree(
    out: &mut StandardStream,
    stats: &DirectoryStats,
    max_items: usize,
) -> anyhow::Result<()> {
    write_line(out, stats, 0)?;
    write_children(out, stats, 1, max_items)?;
    writeln!(out)?;
    Ok(())
}

fn write_children(
    out: &mut StandardStream,
    stats: &DirectoryStats,
    depth: usize,
    max_items: usize,
) -> anyhow::Result<()> {
    if depth > MAX_VISUAL_DEPTH {
        return Ok(());
    }

    let mut children: Vec<&DirectoryStats> = stats.children.iter().collect();
    children.sort_by(|a, b| b.total_size.cmp(&a.total_size));

    for child in children.into_iter().take(max_items) {
        write_line(out, child, depth)?;
        write_children(out, child, depth + 1, max_items)?;
    }
    Ok(())
}

fn write_line(
    out: &mut StandardStream,
    stats: &DirectoryStats,
    depth: usize,
) -> anyhow::Result<()> {
    let indent = "  ".repeat(depth);
    out.set_color(ColorSpec::new().set_bold(true))?;
    write!(out, "{}{}", indent, stats.name())?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(false))?;
    writeln!(out, " {}", human_readable_size(stats.total_size))?;
    out.reset()?;
    Ok(())
}
