//! Utilities for path collection, size formatting and parsing.

use crate::{Result, error::PdfFuseError};
use anyhow::{Context, bail};
use std::path::PathBuf;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// Patterns are expanded in the order given and each pattern's matches are
/// kept in the order `glob` yields them (alphabetical). A pattern without
/// wildcards that matches nothing is kept verbatim so later validation can
/// report it as missing.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from glob iterator.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let pattern = pattern.as_ref();
        let paths = collect_paths_for_pattern(pattern)?;

        if paths.is_empty() && !has_glob_meta(pattern) {
            resolved_paths.push(PathBuf::from(pattern));
        } else {
            resolved_paths.extend(paths);
        }
    }

    Ok(resolved_paths)
}

/// Expand a single glob pattern into filesystem paths.
fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern).map_err(|err| PdfFuseError::Other {
        message: format!("Invalid pattern '{pattern}': {err}"),
    })?;

    for entry in paths {
        let path = entry.map_err(|err| PdfFuseError::Other {
            message: err.to_string(),
        })?;
        resolved_paths.push(path);
    }

    Ok(resolved_paths)
}

fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Format a byte count as a human-readable string.
///
/// Uses binary units, so `1024 * 1024` bytes prints as `1.00 MB`.
pub fn format_file_size(size: u64) -> String {
    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}

/// Parse a human-entered size such as `25MB`, `25 MiB`, `500k` or `1048576`.
///
/// Units are binary regardless of spelling (`MB` and `MiB` both mean 2^20),
/// matching how sizes are displayed. Fractional values are allowed
/// (`1.5MB`). Zero is rejected.
///
/// # Examples
///
/// ```
/// use pdffuse::utils::parse_size;
///
/// assert_eq!(parse_size("25MB").unwrap(), 25 * 1024 * 1024);
/// assert_eq!(parse_size("512").unwrap(), 512);
/// ```
pub fn parse_size(s: &str) -> anyhow::Result<u64> {
    let trimmed = s.trim();
    let split_at = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split_at);

    if number.is_empty() {
        bail!("Invalid size '{s}': expected a number such as 25MB");
    }

    let value: f64 = number
        .parse()
        .with_context(|| format!("Invalid size '{s}'"))?;

    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => KB,
        "m" | "mb" | "mib" => MB,
        "g" | "gb" | "gib" => GB,
        other => bail!("Invalid size unit '{other}' in '{s}'. Use B, KB, MB or GB"),
    };

    let bytes = (value * multiplier as f64).round();
    if bytes < 1.0 {
        bail!("Size must be positive: '{s}'");
    }

    Ok(bytes as u64)
}

/// Parse a comma-separated list of positive integers such as `150,120,90`.
///
/// Order is preserved and duplicates are kept; the caller decides what the
/// order means.
pub fn parse_number_list(s: &str) -> anyhow::Result<Vec<u32>> {
    let mut values = Vec::new();

    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let value: u32 = part
            .parse()
            .with_context(|| format!("Invalid number: {part}"))?;

        if value == 0 {
            bail!("Values must be positive, got 0 in '{s}'");
        }

        values.push(value);
    }

    if values.is_empty() {
        bail!("List cannot be empty");
    }

    Ok(values)
}
