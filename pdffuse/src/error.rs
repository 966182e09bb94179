//! Error types for pdffuse.
//!
//! This module defines all error types that can occur while loading,
//! ordering, merging and writing PDFs. Errors are designed to be
//! actionable: each message names the offending file or limit and, where it
//! helps, how to fix it.
//!
//! Compression never surfaces errors here. Its collaborators report
//! [`crate::compress::CollaboratorError`], which the compressor recovers from
//! locally.
//!
//! # Error Categories
//!
//! - **I/O Errors**: File not found, permission denied, etc.
//! - **PDF Errors**: Invalid PDF structure, encrypted files
//! - **Limit Errors**: Upload size and page count ceilings
//! - **Validation Errors**: Invalid arguments, ordering or configuration

use std::io;
use std::path::PathBuf;

use crate::utils::format_file_size;

/// Result type alias for pdffuse operations.
pub type Result<T> = std::result::Result<T, PdfFuseError>;

/// Main error type for pdffuse operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfFuseError {
    /// Input file was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input file is not accessible (permission denied, etc.).
    #[error("Cannot access file: {}\n  Reason: {source}", .path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Input path is a directory or something else that is not a file.
    #[error("Not a file: {}", .path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Failed to parse a PDF file.
    #[error("Failed to load PDF: {name}\n  Reason: {reason}")]
    FailedToLoadPdf {
        /// Display name of the input.
        name: String,
        /// Reason for the failure.
        reason: String,
    },

    /// PDF is protected by a non-empty password.
    #[error(
        "{name} is password protected and cannot be merged\n  \
         Hint: Remove the protection and try again"
    )]
    EncryptedPdf {
        /// Display name of the input.
        name: String,
    },

    /// Not enough input files for a merge.
    #[error("At least {required} PDF files are required, got {given}")]
    NotEnoughFiles {
        /// Minimum number of inputs.
        required: usize,
        /// Number of inputs supplied.
        given: usize,
    },

    /// Combined input size is above the upload ceiling.
    #[error(
        "Total input size too large ({} > {})",
        format_file_size(*.total),
        format_file_size(*.limit)
    )]
    TotalSizeExceeded {
        /// Combined size of all inputs in bytes.
        total: u64,
        /// Configured ceiling in bytes.
        limit: u64,
    },

    /// Running page total is above the page ceiling.
    #[error("Too many pages in total ({total} > {limit}), merge aborted")]
    TooManyPages {
        /// Page total reached when the limit was crossed.
        total: usize,
        /// Configured ceiling.
        limit: usize,
    },

    /// The requested merge order is not a permutation of the inputs.
    #[error("Invalid merge order: {reason}")]
    InvalidOrder {
        /// What is wrong with the order.
        reason: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output name",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Merge operation failed.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfFuseError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<anyhow::Error> for PdfFuseError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<PdfFuseError>() {
            Ok(err) => err,
            Err(err) => Self::invalid_config(format!("{err:#}")),
        }
    }
}

impl PdfFuseError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(name: impl Into<String>) -> Self {
        Self::EncryptedPdf { name: name.into() }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidOrder error.
    pub fn invalid_order(reason: impl Into<String>) -> Self {
        Self::InvalidOrder {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error only concerns a single input file.
    ///
    /// Such errors name the file so the user can drop or repair it and
    /// retry; everything else is about the run as a whole.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::FileNotAccessible { .. }
                | Self::NotAFile { .. }
                | Self::FailedToLoadPdf { .. }
                | Self::EncryptedPdf { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::NotEnoughFiles { .. } => 1,
            Self::TotalSizeExceeded { .. } => 7,
            Self::TooManyPages { .. } => 7,
            Self::InvalidOrder { .. } => 1,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::MergeFailed { .. } => 6,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
