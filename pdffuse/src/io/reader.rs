//! PDF reading and loading operations.
//!
//! This module provides PDF loading with support for:
//! - Order-preserving parallel loading
//! - Lenient header checks (a bad header warns, parsing still decides)
//! - Empty-password decryption
//! - Detailed load statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdffuse::io::reader::PdfReader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let sources = reader.load_ordered(&paths, 4).await?;
//! # Ok(())
//! # }
//! ```

use lopdf::{Document, Object};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{PdfFuseError, Result};
use crate::order::unique_display_names;
use crate::utils::format_file_size;
use crate::validation::has_pdf_header;

/// A loaded input PDF.
#[derive(Debug)]
pub struct SourcePdf {
    /// The parsed document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Name shown to the user, unique among the inputs of a run.
    pub name: String,

    /// Number of pages in the document.
    pub page_count: usize,

    /// File size in bytes.
    pub file_size: u64,

    /// Time taken to read and parse the file.
    pub load_time: Duration,

    /// Whether the file starts with a `%PDF-` header.
    pub has_header: bool,

    /// Whether the file was encrypted with an empty password.
    pub was_decrypted: bool,
}

/// Statistics for a batch load operation.
#[derive(Debug, Clone, Default)]
pub struct LoadStatistics {
    /// Number of PDFs loaded.
    pub files_loaded: usize,

    /// Total time taken for all loads.
    pub total_time: Duration,

    /// Total size of loaded files.
    pub total_size: u64,

    /// Total number of pages loaded.
    pub total_pages: usize,
}

impl LoadStatistics {
    /// Create statistics from loaded sources.
    pub fn from_sources(sources: &[SourcePdf], total_time: Duration) -> Self {
        Self {
            files_loaded: sources.len(),
            total_time,
            total_size: sources.iter().map(|s| s.file_size).sum(),
            total_pages: sources.iter().map(|s| s.page_count).sum(),
        }
    }

    /// Format total size as human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// PDF reader with configurable loading behavior.
#[derive(Debug, Clone)]
pub struct PdfReader {
    /// Whether to reject documents without pages.
    verify: bool,
}

impl PdfReader {
    /// Create a new PDF reader with default settings.
    pub fn new() -> Self {
        Self { verify: true }
    }

    /// Create a reader that accepts documents without pages.
    pub fn without_verification() -> Self {
        Self { verify: false }
    }

    /// Parse PDF bytes that are already in memory.
    ///
    /// A missing `%PDF-` header is logged and parsing is attempted anyway.
    /// Encrypted documents are opened with an empty password when possible.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The bytes are not a parseable PDF
    /// - The PDF needs a non-empty password
    /// - Verification is on and the PDF has no pages
    pub fn parse(&self, name: &str, bytes: &[u8]) -> Result<SourcePdf> {
        let start = Instant::now();

        let has_header = has_pdf_header(bytes);
        if !has_header {
            tracing::warn!(name, "non-standard PDF header, trying to read anyway");
        }

        let mut document = Document::load_mem(bytes).map_err(|e| {
            let err_msg = e.to_string();
            let lower = err_msg.to_lowercase();
            if lower.contains("encrypt") || lower.contains("password") || lower.contains("decrypt") {
                PdfFuseError::encrypted_pdf(name)
            } else {
                PdfFuseError::failed_to_load_pdf(name, err_msg)
            }
        })?;

        // lopdf decrypts on load when the empty password opens the file and
        // records that in `encryption_state`; only the marker is left to drop.
        let mut was_decrypted = false;
        if document.is_encrypted() {
            if document.encryption_state.take().is_none() {
                return Err(PdfFuseError::encrypted_pdf(name));
            }
            if let Some(Object::Reference(id)) = document.trailer.remove(b"Encrypt") {
                document.objects.remove(&id);
            }
            was_decrypted = true;
            tracing::debug!(name, "opened with empty password");
        }

        let page_count = document.get_pages().len();
        if self.verify && page_count == 0 {
            return Err(PdfFuseError::failed_to_load_pdf(name, "PDF has no pages"));
        }

        Ok(SourcePdf {
            document,
            path: PathBuf::from(name),
            name: name.to_string(),
            page_count,
            file_size: bytes.len() as u64,
            load_time: start.elapsed(),
            has_header,
            was_decrypted,
        })
    }

    /// Load a single PDF document.
    ///
    /// The display name is the file name.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - File is not a valid PDF
    /// - PDF needs a password
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdffuse::io::reader::PdfReader;
    /// # use std::path::Path;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let reader = PdfReader::new();
    /// let loaded = reader.load(Path::new("document.pdf")).await?;
    /// println!("Loaded {} pages in {:?}", loaded.page_count, loaded.load_time);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load(&self, path: &Path) -> Result<SourcePdf> {
        self.load_named(path.to_path_buf(), display_name(path)).await
    }

    async fn load_named(&self, path: PathBuf, name: String) -> Result<SourcePdf> {
        let start = Instant::now();

        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PdfFuseError::file_not_found(path.clone()),
            _ => PdfFuseError::FileNotAccessible {
                path: path.clone(),
                source: e,
            },
        })?;

        // Parse in a blocking task to avoid blocking the async runtime
        let reader = self.clone();
        let mut source = tokio::task::spawn_blocking(move || reader.parse(&name, &bytes))
            .await
            .map_err(|e| PdfFuseError::other(format!("Load task failed: {e}")))??;

        source.path = path;
        source.load_time = start.elapsed();

        Ok(source)
    }

    /// Load PDFs concurrently, keeping the order of `paths`.
    ///
    /// Display names are the file names, made unique with ` (2)`, ` (3)`
    /// suffixes where several inputs share a name.
    ///
    /// # Arguments
    ///
    /// * `paths` - Paths to PDF files
    /// * `workers` - Number of parallel workers (typically CPU core count)
    ///
    /// # Errors
    ///
    /// Returns the error of the first input, in input order, that failed.
    pub async fn load_ordered(&self, paths: &[PathBuf], workers: usize) -> Result<Vec<SourcePdf>> {
        use futures::stream::{self, StreamExt};

        let workers = workers.max(1); // Ensure at least 1 worker

        let names: Vec<String> = paths.iter().map(|p| display_name(p)).collect();
        let names = unique_display_names(&names);

        let tasks = paths.iter().zip(names).map(|(path, name)| {
            let reader = self.clone();
            let path = path.clone();
            async move { reader.load_named(path, name).await }
        });

        // `buffered` yields results in input order
        let results: Vec<Result<SourcePdf>> = stream::iter(tasks).buffered(workers).collect().await;

        results.into_iter().collect()
    }

    /// Load all PDFs and report aggregate statistics.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdffuse::io::reader::PdfReader;
    /// # use std::path::PathBuf;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let reader = PdfReader::new();
    /// let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
    ///
    /// let (sources, stats) = reader.load_all(&paths, 4).await?;
    /// println!("Loaded {} files in {:?}", stats.files_loaded, stats.total_time);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load_all(
        &self,
        paths: &[PathBuf],
        max_workers: usize,
    ) -> Result<(Vec<SourcePdf>, LoadStatistics)> {
        let start = Instant::now();
        let sources = self.load_ordered(paths, max_workers).await?;
        let stats = LoadStatistics::from_sources(&sources, start.elapsed());

        Ok((sources, stats))
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}

/// File name of `path`, or the whole path if it has none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
