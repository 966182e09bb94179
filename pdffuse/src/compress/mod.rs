//! Size-targeted compression of merged documents.
//!
//! A [`Compressor`] tries to bring a document under a byte ceiling in two
//! stages:
//!
//! 1. A lossless repack ([`Repacker`]). If the repacked document is smaller
//!    it becomes the current best, and if it fits the target the search
//!    stops there.
//! 2. A rasterization search ([`Rasterizer`]) over color mode, resolution
//!    and quality. The first candidate that fits wins; if none fits, the
//!    smallest one is used as a best effort.
//!
//! Collaborator failures never surface as errors. A failed repack keeps the
//! original, a failed render or encode skips that grid cell, and an
//! unavailable rasterizer ends the search. The worst case is the input
//! returned unchanged.
//!
//! # Examples
//!
//! ```no_run
//! use pdffuse::compress::{ColorModes, CompressOptions, Compressor};
//!
//! # fn example(merged: Vec<u8>) -> pdffuse::Result<()> {
//! let options = CompressOptions {
//!     color_modes: ColorModes::ColorOnly,
//!     ..CompressOptions::with_target(5 * 1024 * 1024)
//! };
//!
//! let result = Compressor::default().compress(&merged, &options)?;
//! if !result.target_met {
//!     eprintln!("Could not reach the target, best was {} bytes", result.size_after);
//! }
//! # Ok(())
//! # }
//! ```

pub mod lossless;
pub mod raster;
mod search;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::error::{PdfFuseError, Result};

pub use lossless::LopdfRepacker;
pub use raster::{PdftoppmRasterizer, RenderedPages};

/// Resolutions (DPI) tried by default, highest first.
pub const DEFAULT_RESOLUTIONS: [u32; 7] = [150, 120, 110, 100, 90, 75, 60];

/// JPEG qualities tried by default, highest first.
pub const DEFAULT_QUALITIES: [u32; 6] = [85, 75, 60, 50, 40, 30];

/// Default size ceiling: 25 MiB, a common mail attachment limit.
pub const DEFAULT_TARGET_SIZE: u64 = 25 * 1024 * 1024;

/// Failure reported by a compression collaborator.
///
/// Always recovered inside [`Compressor::compress`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// The collaborator cannot run at all (missing program, etc.).
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// A single invocation failed.
    #[error("failed: {0}")]
    Failed(String),
}

/// Lossless size reduction of a whole document.
pub trait Repacker {
    /// Produce a repacked copy of `input`.
    fn repack(&self, input: &[u8]) -> std::result::Result<Vec<u8>, CollaboratorError>;
}

/// Lossy rendering of a document into image-only pages.
///
/// Rendering and encoding are separate so one render per
/// `(color mode, resolution)` can be re-encoded at several qualities.
pub trait Rasterizer {
    /// Render every page of `input` at `resolution` DPI.
    fn render(
        &self,
        input: &[u8],
        resolution: u32,
        color_mode: ColorMode,
    ) -> std::result::Result<RenderedPages, CollaboratorError>;

    /// Encode rendered pages at `quality` (1-100) and assemble a document
    /// with one image page per rendered page.
    fn assemble(
        &self,
        pages: &RenderedPages,
        quality: u32,
    ) -> std::result::Result<Vec<u8>, CollaboratorError>;

    /// Render and assemble in one step.
    fn rasterize(
        &self,
        input: &[u8],
        resolution: u32,
        quality: u32,
        color_mode: ColorMode,
    ) -> std::result::Result<Vec<u8>, CollaboratorError> {
        let pages = self.render(input, resolution, color_mode)?;
        self.assemble(&pages, quality)
    }
}

/// Color mode used when rasterizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Single channel gray.
    Grayscale,
    /// Full RGB.
    Color,
}

impl ColorMode {
    /// Whether this mode renders in gray.
    pub fn is_grayscale(self) -> bool {
        matches!(self, Self::Grayscale)
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grayscale => write!(f, "grayscale"),
            Self::Color => write!(f, "color"),
        }
    }
}

/// Which color modes the rasterization search tries, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorModes {
    /// Grayscale first, then color (default).
    #[default]
    GrayscaleThenColor,
    /// Color only.
    ColorOnly,
    /// Grayscale only.
    GrayscaleOnly,
}

impl ColorModes {
    /// Modes in search order.
    pub fn sequence(self) -> &'static [ColorMode] {
        match self {
            Self::GrayscaleThenColor => &[ColorMode::Grayscale, ColorMode::Color],
            Self::ColorOnly => &[ColorMode::Color],
            Self::GrayscaleOnly => &[ColorMode::Grayscale],
        }
    }
}

impl FromStr for ColorModes {
    type Err = PdfFuseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gray-then-color" | "auto" => Ok(Self::GrayscaleThenColor),
            "color" => Ok(Self::ColorOnly),
            "gray" | "grayscale" => Ok(Self::GrayscaleOnly),
            _ => Err(PdfFuseError::invalid_config(format!(
                "Invalid color mode: {s}. Must be one of: gray-then-color, color, gray"
            ))),
        }
    }
}

/// Transform that produced a [`CompressionResult`].
///
/// The `Display` label is `none`, `lossless` or
/// `rasterize(resolution=<d>,quality=<q>,gray=<bool>)` and has no slot for
/// a missed target. A best-effort raster shows up as `best_effort` here and
/// as `target_met == false` on the result, which is what callers warn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Input returned unchanged.
    None,
    /// Lossless repack.
    Lossless,
    /// Rasterized pages.
    Rasterize {
        /// Resolution in DPI.
        resolution: u32,
        /// JPEG quality.
        quality: u32,
        /// Whether pages were rendered in gray.
        grayscale: bool,
        /// No candidate fit the target; this was the smallest one.
        best_effort: bool,
    },
}

impl CompressionMethod {
    /// Whether text was turned into images.
    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::Rasterize { .. })
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Lossless => write!(f, "lossless"),
            Self::Rasterize {
                resolution,
                quality,
                grayscale,
                ..
            } => write!(
                f,
                "rasterize(resolution={resolution},quality={quality},gray={grayscale})"
            ),
        }
    }
}

/// One cell of the rasterization grid that produced output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RasterAttempt {
    /// Resolution in DPI.
    pub resolution: u32,
    /// JPEG quality.
    pub quality: u32,
    /// Color mode.
    pub color_mode: ColorMode,
    /// Size of the assembled document in bytes.
    pub size: u64,
}

/// Outcome of [`Compressor::compress`].
#[derive(Debug, Clone)]
pub struct CompressionResult {
    /// Bytes of the accepted document.
    pub final_bytes: Vec<u8>,
    /// How `final_bytes` was produced.
    pub method: CompressionMethod,
    /// Input size in bytes.
    pub size_before: u64,
    /// Output size in bytes, always `final_bytes.len()`.
    pub size_after: u64,
    /// Whether `size_after` is within the target.
    pub target_met: bool,
    /// Every raster attempt that produced output, in search order.
    pub attempts: Vec<RasterAttempt>,
}

impl CompressionResult {
    fn new(
        final_bytes: Vec<u8>,
        method: CompressionMethod,
        size_before: u64,
        target_size: u64,
        attempts: Vec<RasterAttempt>,
    ) -> Self {
        let size_after = final_bytes.len() as u64;

        Self {
            final_bytes,
            method,
            size_before,
            size_after,
            target_met: size_after <= target_size,
            attempts,
        }
    }

    /// Size reduction as a percentage of the input.
    pub fn reduction_percent(&self) -> f64 {
        if self.size_before == 0 {
            return 0.0;
        }
        (1.0 - self.size_after as f64 / self.size_before as f64) * 100.0
    }
}

/// Options for one compression run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressOptions {
    /// Byte ceiling.
    pub target_size: u64,
    /// Resolutions to try, in order.
    pub resolutions: Vec<u32>,
    /// Qualities to try for each resolution, in order.
    pub qualities: Vec<u32>,
    /// Run the rasterization search when lossless is not enough.
    pub try_lossy_if_over_target: bool,
    /// Color modes to try.
    pub color_modes: ColorModes,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self::with_target(DEFAULT_TARGET_SIZE)
    }
}

impl CompressOptions {
    /// Default grid with a custom target.
    pub fn with_target(target_size: u64) -> Self {
        Self {
            target_size,
            resolutions: DEFAULT_RESOLUTIONS.to_vec(),
            qualities: DEFAULT_QUALITIES.to_vec(),
            try_lossy_if_over_target: true,
            color_modes: ColorModes::default(),
        }
    }

    /// Check the options before any work is done.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the target is zero, a candidate list is
    /// empty or contains zero, or a quality is above 100.
    pub fn validate(&self) -> Result<()> {
        if self.target_size == 0 {
            return Err(PdfFuseError::invalid_config("Target size must be positive"));
        }

        if self.resolutions.is_empty() {
            return Err(PdfFuseError::invalid_config(
                "At least one resolution is required",
            ));
        }

        if self.qualities.is_empty() {
            return Err(PdfFuseError::invalid_config(
                "At least one quality is required",
            ));
        }

        if self.resolutions.contains(&0) {
            return Err(PdfFuseError::invalid_config("Resolutions must be positive"));
        }

        if let Some(q) = self.qualities.iter().find(|&&q| q == 0 || q > 100) {
            return Err(PdfFuseError::invalid_config(format!(
                "Invalid quality: {q}. Must be between 1 and 100"
            )));
        }

        Ok(())
    }
}

/// Size-targeted compressor over a repacker and a rasterizer.
#[derive(Debug, Clone)]
pub struct Compressor<P = LopdfRepacker, R = PdftoppmRasterizer> {
    repacker: P,
    rasterizer: R,
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(LopdfRepacker::new(), PdftoppmRasterizer::new())
    }
}

impl<P: Repacker, R: Rasterizer> Compressor<P, R> {
    /// Create a compressor from its collaborators.
    pub fn new(repacker: P, rasterizer: R) -> Self {
        Self {
            repacker,
            rasterizer,
        }
    }

    /// Compress `input` toward `options.target_size`.
    ///
    /// The returned document is never larger than `input`. An empty input
    /// is returned unchanged.
    ///
    /// # Errors
    ///
    /// Only invalid options are reported; see [`CompressOptions::validate`].
    pub fn compress(&self, input: &[u8], options: &CompressOptions) -> Result<CompressionResult> {
        options.validate()?;

        let start = Instant::now();
        let size_before = input.len() as u64;
        let target = options.target_size;

        if input.is_empty() {
            return Ok(CompressionResult::new(
                Vec::new(),
                CompressionMethod::None,
                0,
                target,
                Vec::new(),
            ));
        }

        let (mut best, mut method) = match self.repacker.repack(input) {
            Ok(repacked) if repacked.len() < input.len() => {
                tracing::debug!(before = input.len(), after = repacked.len(), "lossless repack");
                (repacked, CompressionMethod::Lossless)
            }
            Ok(repacked) => {
                tracing::debug!(
                    before = input.len(),
                    after = repacked.len(),
                    "lossless repack did not shrink the document"
                );
                (input.to_vec(), CompressionMethod::None)
            }
            Err(err) => {
                tracing::debug!(error = %err, "lossless repack failed, keeping original");
                (input.to_vec(), CompressionMethod::None)
            }
        };

        let mut attempts = Vec::new();

        if best.len() as u64 > target
            && options.try_lossy_if_over_target
            && let Some(candidate) =
                search::find_candidate(&self.rasterizer, &best, options, &mut attempts)
            && candidate.bytes.len() < best.len()
        {
            method = CompressionMethod::Rasterize {
                resolution: candidate.resolution,
                quality: candidate.quality,
                grayscale: candidate.color_mode.is_grayscale(),
                best_effort: candidate.best_effort,
            };
            best = candidate.bytes;
        }

        let result = CompressionResult::new(best, method, size_before, target, attempts);

        tracing::info!(
            method = %result.method,
            before = result.size_before,
            after = result.size_after,
            target_met = result.target_met,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "compression finished"
        );

        Ok(result)
    }
}
