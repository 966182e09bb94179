//! Writing the final document.
//!
//! This module provides safe output writing with:
//! - Atomic writes (write to a temp file in the target directory, then rename)
//! - Pre-flight checks on the output directory
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdffuse::io::writer::PdfWriter;
//! use std::path::Path;
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.write(&bytes, Path::new("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{PdfFuseError, Result};
use crate::utils::format_file_size;

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Output writer.
#[derive(Debug, Clone)]
pub struct PdfWriter {
    atomic: bool,
}

impl PdfWriter {
    /// Create a new writer with atomic writes.
    pub fn new() -> Self {
        Self { atomic: true }
    }

    /// Create a writer without atomic writes (faster but less safe).
    pub fn non_atomic() -> Self {
        Self { atomic: false }
    }

    /// Write document bytes to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Output directory doesn't exist
    /// - Insufficient permissions
    /// - Disk full
    pub async fn write(&self, bytes: &[u8], path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let bytes = bytes.to_vec();
        let atomic = self.atomic;

        task::spawn_blocking(move || {
            let start = Instant::now();

            if atomic {
                write_atomic(&bytes, &path_buf)?;
            } else {
                std::fs::write(&path_buf, &bytes).map_err(|e| PdfFuseError::FailedToWrite {
                    path: path_buf.clone(),
                    source: e,
                })?;
            }

            Ok::<_, PdfFuseError>(WriteStatistics {
                write_time: start.elapsed(),
                file_size: bytes.len() as u64,
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| PdfFuseError::other(format!("Write task failed: {e}")))?
    }

    /// Check if a file can be written to the given path.
    ///
    /// Performs pre-flight checks without actually writing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory doesn't exist
    /// - Parent directory is not writable
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let metadata = tokio::fs::metadata(parent).await.map_err(|_| {
            PdfFuseError::invalid_config(format!(
                "Output directory does not exist: {}",
                parent.display()
            ))
        })?;

        if !metadata.is_dir() {
            return Err(PdfFuseError::invalid_config(format!(
                "Output directory is not a directory: {}",
                parent.display()
            )));
        }

        if metadata.permissions().readonly() {
            return Err(PdfFuseError::invalid_config(format!(
                "Output directory is not writable: {}",
                parent.display()
            )));
        }

        Ok(())
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn write_atomic(bytes: &[u8], path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        PdfFuseError::FailedToCreateOutput {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    temp.write_all(bytes)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| PdfFuseError::FailedToWrite {
            path: path.to_path_buf(),
            source: e,
        })?;

    temp.persist(path).map_err(|e| PdfFuseError::FailedToWrite {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}
