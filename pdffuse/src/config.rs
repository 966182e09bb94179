//! Configuration module for pdffuse.
//!
//! This module transforms CLI arguments into a validated, normalized configuration
//! that drives loading, ordering, merging and compression. It handles:
//! - Validation of argument combinations
//! - Input and page limits (with environment overrides)
//! - Merge order selection
//! - Application of defaults

use anyhow::{Result, bail};
use std::path::PathBuf;
use std::str::FromStr;

use crate::PdfFuseError;
use crate::compress::CompressOptions;

/// Environment variable overriding the upload ceiling in MiB.
pub const MAX_UPLOAD_MB_ENV: &str = "PDFFUSE_MAX_UPLOAD_MB";

/// Environment variable overriding the page ceiling.
pub const MAX_PAGES_ENV: &str = "PDFFUSE_MAX_PAGES";

/// Default upload ceiling in MiB.
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 200;

/// Default page ceiling.
pub const DEFAULT_MAX_PAGES: usize = 2000;

/// Ceilings applied to the inputs of a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum combined input size in bytes.
    pub max_upload_bytes: u64,
    /// Maximum number of pages in the merged document.
    pub max_pages: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_MB, DEFAULT_MAX_PAGES)
    }
}

impl Limits {
    /// Create limits from a size in MiB and a page count.
    pub fn new(max_upload_mb: u64, max_pages: usize) -> Self {
        Self {
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            max_pages,
        }
    }

    /// Read limits from the environment, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but is not a positive integer.
    pub fn from_env() -> crate::Result<Self> {
        let max_upload_mb = read_env_number(MAX_UPLOAD_MB_ENV)?.unwrap_or(DEFAULT_MAX_UPLOAD_MB);
        let max_pages = read_env_number(MAX_PAGES_ENV)?
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_PAGES);

        Ok(Self::new(max_upload_mb, max_pages))
    }
}

fn read_env_number(name: &str) -> crate::Result<Option<u64>> {
    match std::env::var(name) {
        Ok(value) => {
            let n: u64 = value.trim().parse().map_err(|_| {
                PdfFuseError::invalid_config(format!(
                    "{name} must be a positive integer, got '{value}'"
                ))
            })?;
            if n == 0 {
                return Err(PdfFuseError::invalid_config(format!(
                    "{name} must be a positive integer, got '{value}'"
                )));
            }
            Ok(Some(n))
        }
        Err(_) => Ok(None),
    }
}

/// How inputs are ordered before merging.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OrderMode {
    /// Keep the order given on the command line (default).
    #[default]
    AsGiven,
    /// Sort by display name, ignoring case.
    Alphabetical,
    /// Explicit 1-based positions, e.g. `3,1,2`.
    Explicit(Vec<usize>),
}

impl OrderMode {
    /// Parse an explicit order such as `3,1,2`.
    ///
    /// Only the syntax is checked here; whether the positions form a
    /// permutation of the inputs is checked once the inputs are known.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdffuse::config::OrderMode;
    ///
    /// let order = OrderMode::parse_explicit("2, 1").unwrap();
    /// assert_eq!(order, OrderMode::Explicit(vec![2, 1]));
    /// ```
    pub fn parse_explicit(s: &str) -> Result<Self> {
        let positions = crate::utils::parse_number_list(s)?
            .into_iter()
            .map(|n| n as usize)
            .collect();

        Ok(Self::Explicit(positions))
    }
}

/// Format of the final run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human-readable messages (default).
    #[default]
    Text,
    /// A single JSON document on stdout.
    Json,
}

impl FromStr for ReportFormat {
    type Err = PdfFuseError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(PdfFuseError::invalid_config(format!(
                "Invalid report format: {s}. Must be one of: text, json"
            ))),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for a merge run.
///
/// This structure contains all settings needed to perform a merge,
/// derived and validated from CLI arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input PDF file paths, after glob expansion, in the order given.
    pub inputs: Vec<PathBuf>,

    /// Output PDF file path.
    pub output: PathBuf,

    /// Dry run mode - validate without creating output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Accept a single input file.
    pub allow_single: bool,

    /// Merge order.
    pub order: OrderMode,

    /// Upload and page ceilings.
    pub limits: Limits,

    /// Size-targeted compression, or `None` to write the merge as is.
    pub compression: Option<CompressOptions>,

    /// Report format.
    pub report: ReportFormat,

    /// Number of parallel jobs (None = auto-detect).
    pub jobs: Option<usize>,
}

impl Config {
    /// Minimum number of inputs for this configuration.
    pub fn min_inputs(&self) -> usize {
        if self.allow_single { 1 } else { 2 }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Fewer inputs than [`Config::min_inputs`] are given
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - A limit is zero
    /// - The output path is also an input
    /// - An explicit order is not a permutation of the inputs
    /// - Compression options are invalid
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        if self.inputs.len() < self.min_inputs() {
            bail!(PdfFuseError::NotEnoughFiles {
                required: self.min_inputs(),
                given: self.inputs.len(),
            });
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            bail!("Number of jobs must be at least 1");
        }

        if self.limits.max_upload_bytes == 0 || self.limits.max_pages == 0 {
            bail!("Limits must be positive");
        }

        // Validate that output path is not in inputs
        for input in &self.inputs {
            if input == &self.output {
                bail!(
                    "Output file cannot be the same as an input file: {}",
                    self.output.display()
                );
            }
        }

        if let OrderMode::Explicit(ref positions) = self.order {
            crate::order::check_positions(positions, self.inputs.len())?;
        }

        if let Some(ref compression) = self.compression {
            compression.validate()?;
        }

        Ok(())
    }

    /// Get the effective number of parallel jobs.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run, or when a
    /// JSON report owns stdout.
    pub fn should_print(&self) -> bool {
        self.report == ReportFormat::Text && (!self.quiet || self.dry_run)
    }
}
