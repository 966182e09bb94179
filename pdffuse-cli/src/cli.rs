//! CLI argument parsing for pdffuse.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, validation, and help text generation.

use clap::Parser;
use std::path::PathBuf;

use pdffuse::compress::{
    ColorModes, CompressOptions, DEFAULT_QUALITIES, DEFAULT_RESOLUTIONS,
};
use pdffuse::config::{
    Config, DEFAULT_MAX_PAGES, DEFAULT_MAX_UPLOAD_MB, Limits, MAX_PAGES_ENV, MAX_UPLOAD_MB_ENV,
    OrderMode, OverwriteMode, ReportFormat,
};
use pdffuse::error::{PdfFuseError, Result};
use pdffuse::naming::resolve_output;
use pdffuse::utils::{parse_number_list, parse_size};

/// Merge PDF files in a chosen order and fit the result under a size ceiling.
///
/// Every page of every input is appended in order. The merged document is
/// then repacked losslessly and, if it is still above the target size,
/// rasterized at decreasing resolution and quality until it fits.
#[derive(Parser, Debug)]
#[command(name = "pdffuse")]
#[command(version)]
#[command(about = "Merge PDF files and fit the result under a size ceiling", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input PDF files or glob patterns, merged in the order given
    ///
    /// Examples:
    ///   pdffuse a.pdf b.pdf
    ///   pdffuse 'scans/*.pdf' --sort alpha
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Output PDF file path
    ///
    /// Takes precedence over --name and --output-dir.
    #[arg(short, long, value_name = "FILE", conflicts_with_all = ["name", "output_dir"])]
    pub output: Option<PathBuf>,

    /// Output file name, sanitized and suffixed with .pdf
    ///
    /// Defaults to fusion_<date>_<time>.pdf.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Directory for the output file (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Target size of the output, e.g. 25MB, 500k or 1048576
    #[arg(short, long, value_name = "SIZE", default_value = "25MB")]
    pub target_size: String,

    /// Raster resolutions to try, in DPI, in order (e.g. 150,120,90)
    #[arg(long, value_name = "DPI,...")]
    pub resolutions: Option<String>,

    /// JPEG qualities to try, in order (e.g. 85,60,40)
    #[arg(long, value_name = "Q,...")]
    pub qualities: Option<String>,

    /// Color modes to try: gray-then-color, gray or color
    #[arg(long, value_name = "MODES", default_value = "gray-then-color")]
    pub color_modes: String,

    /// Do not compress the merged document
    #[arg(long)]
    pub no_compress: bool,

    /// Only compress losslessly, never rasterize
    #[arg(long, conflicts_with = "no_compress")]
    pub no_lossy: bool,

    /// Sort inputs by name, ignoring case
    #[arg(long, value_name = "KEY", value_parser = ["alpha"], conflicts_with = "order")]
    pub sort: Option<String>,

    /// Explicit merge order as 1-based positions (e.g. 3,1,2)
    #[arg(long, value_name = "POSITIONS")]
    pub order: Option<String>,

    /// Accept a single input (repack or compress one file)
    #[arg(long)]
    pub allow_single: bool,

    /// Ceiling on the combined input size, in MiB
    #[arg(long, value_name = "MB", env = MAX_UPLOAD_MB_ENV)]
    pub max_upload_mb: Option<u64>,

    /// Ceiling on the total number of pages
    #[arg(long, value_name = "N", env = MAX_PAGES_ENV)]
    pub max_pages: Option<usize>,

    /// Force overwrite of an existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite an existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Validate inputs and show the merge plan without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output, including every raster attempt
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Number of inputs loaded concurrently (default: CPU cores)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Report format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text", value_parser = ["text", "json"])]
    pub report: String,
}

impl Cli {
    /// Validate arguments that need no file I/O.
    ///
    /// # Errors
    ///
    /// Returns an error if inputs are missing or a count is zero.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(PdfFuseError::invalid_config("No input files specified"));
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err(PdfFuseError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        if self.max_upload_mb == Some(0) {
            return Err(PdfFuseError::invalid_config(
                "--max-upload-mb must be at least 1",
            ));
        }

        if self.max_pages == Some(0) {
            return Err(PdfFuseError::invalid_config("--max-pages must be at least 1"));
        }

        Ok(())
    }

    /// Build compression options, or `None` with `--no-compress`.
    ///
    /// # Errors
    ///
    /// Returns an error if a size, list or color mode does not parse.
    pub fn compress_options(&self) -> Result<Option<CompressOptions>> {
        if self.no_compress {
            return Ok(None);
        }

        let resolutions = match self.resolutions {
            Some(ref list) => parse_number_list(list)?,
            None => DEFAULT_RESOLUTIONS.to_vec(),
        };
        let qualities = match self.qualities {
            Some(ref list) => parse_number_list(list)?,
            None => DEFAULT_QUALITIES.to_vec(),
        };

        Ok(Some(CompressOptions {
            target_size: parse_size(&self.target_size)?,
            resolutions,
            qualities,
            try_lossy_if_over_target: !self.no_lossy,
            color_modes: self.color_modes.parse::<ColorModes>()?,
        }))
    }

    /// Convert arguments into a validated [`Config`] for the expanded
    /// `inputs`.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument does not parse or the resulting
    /// configuration is invalid.
    pub fn to_config(&self, inputs: Vec<PathBuf>) -> Result<Config> {
        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let order = match (&self.sort, &self.order) {
            (_, Some(positions)) => OrderMode::parse_explicit(positions)?,
            (Some(_), None) => OrderMode::Alphabetical,
            (None, None) => OrderMode::AsGiven,
        };

        let output = match self.output {
            Some(ref output) => output.clone(),
            None => resolve_output(self.name.as_deref(), self.output_dir.as_deref()),
        };

        let limits = Limits::new(
            self.max_upload_mb.unwrap_or(DEFAULT_MAX_UPLOAD_MB),
            self.max_pages.unwrap_or(DEFAULT_MAX_PAGES),
        );

        let config = Config {
            inputs,
            output,
            dry_run: self.dry_run,
            verbose: self.verbose,
            overwrite_mode,
            quiet: self.quiet,
            allow_single: self.allow_single,
            order,
            limits,
            compression: self.compress_options()?,
            report: self.report.parse::<ReportFormat>()?,
            jobs: self.jobs,
        };

        config.validate()?;

        Ok(config)
    }
}
