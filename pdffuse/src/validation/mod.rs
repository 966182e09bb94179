//! Input validation for pdffuse.
//!
//! This module checks inputs and output before any PDF is parsed:
//! - File existence and accessibility
//! - Combined input size against the upload ceiling
//! - Output path checks
//!
//! Header sniffing and the page ceiling live here too; they are applied by
//! the reader and the merger as documents go through.
//!
//! # Examples
//!
//! ```no_run
//! use pdffuse::config::Limits;
//! use pdffuse::validation::Validator;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let validator = Validator::new(Limits::default());
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let summary = validator.validate_inputs(&paths).await?;
//! println!("{} files, {}", summary.files_validated, summary.format_total_size());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{Config, Limits};
use crate::error::{PdfFuseError, Result};
use crate::io::reader::display_name;
use crate::order::unique_display_names;
use crate::utils::format_file_size;

/// Number of leading bytes searched for the `%PDF-` marker.
const HEADER_WINDOW: usize = 1024;

/// Check whether `bytes` start with a PDF header.
///
/// Leading whitespace within the first 1024 bytes is ignored.
///
/// # Examples
///
/// ```
/// use pdffuse::validation::has_pdf_header;
///
/// assert!(has_pdf_header(b"%PDF-1.7\n..."));
/// assert!(has_pdf_header(b"\r\n  %PDF-1.4"));
/// assert!(!has_pdf_header(b"<html>"));
/// ```
pub fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(HEADER_WINDOW)];
    window.trim_ascii_start().starts_with(b"%PDF-")
}

/// Check a running page total against the page ceiling.
///
/// # Errors
///
/// Returns `TooManyPages` if `total` is above `limit`.
pub fn check_page_total(total: usize, limit: usize) -> Result<()> {
    if total > limit {
        return Err(PdfFuseError::TooManyPages { total, limit });
    }
    Ok(())
}

/// A validated input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputInfo {
    /// Path to the file.
    pub path: PathBuf,

    /// Unique display name.
    pub name: String,

    /// Size of the file in bytes.
    pub file_size: u64,
}

/// Summary of input validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    /// Validated inputs, in input order.
    pub inputs: Vec<InputInfo>,

    /// Total file size in bytes.
    pub total_size: u64,

    /// Number of files that passed validation.
    pub files_validated: usize,
}

impl ValidationSummary {
    /// Create a summary from validated inputs.
    pub fn from_inputs(inputs: Vec<InputInfo>) -> Self {
        let total_size = inputs.iter().map(|i| i.file_size).sum();
        let files_validated = inputs.len();

        Self {
            inputs,
            total_size,
            files_validated,
        }
    }

    /// Display names, in input order.
    pub fn names(&self) -> Vec<String> {
        self.inputs.iter().map(|i| i.name.clone()).collect()
    }

    /// Format the total file size as a human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// Validator for inputs and output.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: Limits,
}

impl Validator {
    /// Create a validator enforcing `limits`.
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    /// Validate a single input path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist, is not a regular file,
    /// or cannot be accessed.
    pub async fn validate_file(&self, path: &Path) -> Result<u64> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PdfFuseError::file_not_found(path.to_path_buf()),
            _ => PdfFuseError::FileNotAccessible {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        if !metadata.is_file() {
            return Err(PdfFuseError::not_a_file(path.to_path_buf()));
        }

        Ok(metadata.len())
    }

    /// Validate all inputs and the combined size.
    ///
    /// # Errors
    ///
    /// Returns the first per-file error in input order, or
    /// `TotalSizeExceeded` if the combined size is above the upload ceiling.
    pub async fn validate_inputs(&self, paths: &[PathBuf]) -> Result<ValidationSummary> {
        let names: Vec<String> = paths.iter().map(|p| display_name(p)).collect();
        let names = unique_display_names(&names);

        let mut inputs = Vec::with_capacity(paths.len());
        for (path, name) in paths.iter().zip(names) {
            let file_size = self.validate_file(path).await?;
            inputs.push(InputInfo {
                path: path.clone(),
                name,
                file_size,
            });
        }

        let summary = ValidationSummary::from_inputs(inputs);

        if summary.total_size > self.limits.max_upload_bytes {
            return Err(PdfFuseError::TotalSizeExceeded {
                total: summary.total_size,
                limit: self.limits.max_upload_bytes,
            });
        }

        Ok(summary)
    }

    /// Validate the output location of a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the output path is a directory or its parent
    /// directory is missing or read-only.
    pub async fn validate_output(&self, config: &Config) -> Result<()> {
        if tokio::fs::metadata(&config.output)
            .await
            .is_ok_and(|m| m.is_dir())
        {
            return Err(PdfFuseError::invalid_config(format!(
                "Output path is a directory: {}",
                config.output.display()
            )));
        }

        crate::io::PdfWriter::new().can_write(&config.output).await
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}
