//! Run warnings and the machine-readable run report.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::compress::{CompressionResult, RasterAttempt};
use crate::error::{PdfFuseError, Result};
use crate::merge::MergeStatistics;
use crate::order::MergeOrder;
use crate::utils::format_file_size;

/// Something the user should know about the produced document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunWarning {
    /// An input did not start with a `%PDF-` header but was read anyway.
    NonStandardHeader {
        /// Display name of the input.
        name: String,
    },
    /// Digital signatures do not survive a merge.
    SignaturesInvalidated,
    /// Compression could not reach the target size.
    TargetNotMet {
        /// Target size in bytes.
        target: u64,
        /// Size reached in bytes.
        achieved: u64,
    },
    /// Pages were rasterized; text is no longer selectable or searchable.
    TextRasterized,
}

impl RunWarning {
    /// Collect the warnings of a finished run, in display order.
    ///
    /// `headerless` names inputs without a PDF header. `compression` is the
    /// outcome of compression, if it ran, together with its target.
    pub fn collect<I>(headerless: I, compression: Option<(&CompressionResult, u64)>) -> Vec<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut warnings: Vec<Self> = headerless
            .into_iter()
            .map(|name| Self::NonStandardHeader { name })
            .collect();

        warnings.push(Self::SignaturesInvalidated);

        if let Some((result, target)) = compression {
            if !result.target_met {
                warnings.push(Self::TargetNotMet {
                    target,
                    achieved: result.size_after,
                });
            }
            if result.method.is_lossy() {
                warnings.push(Self::TextRasterized);
            }
        }

        warnings
    }
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonStandardHeader { name } => {
                write!(f, "{name}: non-standard PDF header, read anyway")
            }
            Self::SignaturesInvalidated => write!(
                f,
                "Digital signatures in the inputs are no longer valid after merging"
            ),
            Self::TargetNotMet { target, achieved } => write!(
                f,
                "Could not reach the target size of {} (best: {})",
                format_file_size(*target),
                format_file_size(*achieved)
            ),
            Self::TextRasterized => write!(
                f,
                "Pages were converted to images: text can no longer be selected or searched"
            ),
        }
    }
}

/// Summary of a run, printed with `--report json`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Output path.
    pub output: PathBuf,
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Input names in merge order.
    pub order: Vec<String>,
    /// Combined size of the inputs in bytes.
    pub input_size: u64,
    /// Pages in the merged document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,
    /// Size of the merged document before compression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_size: Option<u64>,
    /// Size of the written document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_size: Option<u64>,
    /// Compression method label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Compression target in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_size: Option<u64>,
    /// Whether the target was met.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_met: Option<bool>,
    /// Raster attempts, in search order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<RasterAttempt>,
    /// Warning messages.
    pub warnings: Vec<String>,
}

impl RunReport {
    /// Start a report for a planned merge.
    pub fn planned(output: PathBuf, order: &MergeOrder, input_size: u64, dry_run: bool) -> Self {
        Self {
            output,
            dry_run,
            order: order.names().to_vec(),
            input_size,
            ..Self::default()
        }
    }

    /// Record the merge.
    pub fn with_merge(mut self, stats: &MergeStatistics, merged_size: u64) -> Self {
        self.total_pages = Some(stats.total_pages);
        self.merged_size = Some(merged_size);
        self.final_size = Some(merged_size);
        self
    }

    /// Record compression against `target`.
    pub fn with_compression(mut self, result: &CompressionResult, target: u64) -> Self {
        self.final_size = Some(result.size_after);
        self.method = Some(result.method.to_string());
        self.target_size = Some(target);
        self.target_met = Some(result.target_met);
        self.attempts = result.attempts.clone();
        self
    }

    /// Record warnings.
    pub fn with_warnings(mut self, warnings: &[RunWarning]) -> Self {
        self.warnings = warnings.iter().map(ToString::to_string).collect();
        self
    }

    /// Render as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PdfFuseError::other(format!("Failed to serialize report: {e}")))
    }
}
