use std::sync::LazyLock;

use anyhow::{anyhow, bail, Result};
use regex::Regex;

static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*([KMGT]?B?)$").expect("size pattern"));

/// Parse a human size string ("1MB", "500KB", "2.5gb") into bytes.
/// Case-insensitive; units are powers of 1024; a bare number means
/// bytes.
pub fn parse_size(input: &str) -> Result<u64> {
    let normalized = input.trim().to_uppercase();
    if normalized.is_empty() || normalized == "0" {
        return Ok(0);
    }

    let captures = SIZE_RE
        .captures(&normalized)
        .ok_or_else(|| anyhow!("invalid size format: {}", input))?;

    let magnitude: f64 = captures[1].parse()?;
    let unit = captures.get(2).map(|m| m.as_str()).unwrap_or("B");
    let multiplier: u64 = match unit {
        "" | "B" => 1,
        "KB" => 1024,
        "MB" => 1024u64.pow(2),
        "GB" => 1024u64.pow(3),
        "TB" => 1024u64.pow(4),
        other => bail!("invalid size unit: {}", other),
    };

    Ok((magnitude * multiplier as f64) as u64)
}
