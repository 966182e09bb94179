//! Output file naming.
//!
//! # Examples
//!
//! ```
//! use pdffuse::naming::sanitize_filename;
//!
//! assert_eq!(sanitize_filename("  Q3   report: final "), "Q3 report_ final.pdf");
//! assert_eq!(sanitize_filename("scan.PDF"), "scan.PDF");
//! ```

use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};

/// Characters that cannot appear in a file name on common platforms.
const FORBIDDEN: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Default output name for the current local time, e.g.
/// `fusion_2024-05-01_14-03-59.pdf`.
pub fn default_output_name() -> String {
    default_output_name_at(Local::now().naive_local())
}

/// Default output name for a given time.
pub fn default_output_name_at(time: NaiveDateTime) -> String {
    time.format("fusion_%Y-%m-%d_%H-%M-%S.pdf").to_string()
}

/// Turn a user-supplied name into a safe PDF file name.
///
/// Whitespace runs become one space and the ends are trimmed. Runs of
/// forbidden characters become `_`. Trailing dots are dropped and `.pdf` is
/// appended unless the name already ends with it, in any case. A name left
/// empty, `.` or `..` becomes [`default_output_name`].
pub fn sanitize_filename(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut cleaned = String::with_capacity(collapsed.len());
    let mut in_forbidden_run = false;
    for c in collapsed.chars() {
        if FORBIDDEN.contains(&c) {
            if !in_forbidden_run {
                cleaned.push('_');
            }
            in_forbidden_run = true;
        } else {
            cleaned.push(c);
            in_forbidden_run = false;
        }
    }

    let trimmed = cleaned.trim_end_matches('.');
    if trimmed.is_empty() || cleaned == "." || cleaned == ".." {
        return default_output_name();
    }

    if trimmed.to_lowercase().ends_with(".pdf") {
        trimmed.to_string()
    } else {
        format!("{trimmed}.pdf")
    }
}

/// Resolve the output path from an optional name and directory.
///
/// Without a name the default name is used. Without a directory the
/// current directory is used.
pub fn resolve_output(name: Option<&str>, dir: Option<&Path>) -> PathBuf {
    let file_name = name.map_or_else(default_output_name, sanitize_filename);

    match dir {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}
