//! pdffuse - Merge PDF files in a chosen order and fit the result under a
//! size ceiling.
//!
//! This library provides the pieces behind the `pdffuse` command:
//!
//! - Loading and validating inputs against upload and page limits
//! - Ordering inputs (explicit, alphabetical or reconciled with a previous order)
//! - Merging every page of every input, carrying form fields along
//! - Size-targeted compression: a lossless repack first, then a
//!   rasterization search over color mode, resolution and quality
//! - Output naming and atomic writes
//!
//! # Examples
//!
//! ## Compress a merged document
//!
//! ```no_run
//! use pdffuse::compress::{CompressOptions, Compressor};
//!
//! # fn example(merged: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let compressor = Compressor::default();
//! let options = CompressOptions::with_target(10 * 1024 * 1024);
//!
//! let result = compressor.compress(&merged, &options)?;
//! println!("{} -> {} bytes via {}", result.size_before, result.size_after, result.method);
//! # Ok(())
//! # }
//! ```
//!
//! ## Merge files from disk
//!
//! ```no_run
//! use pdffuse::io::PdfReader;
//! use pdffuse::merge::Merger;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let sources = reader.load_ordered(&paths, 4).await?;
//!
//! let result = Merger::new(2000).merge(&sources)?;
//! println!("Merged {} pages", result.statistics.total_pages);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compress;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod naming;
pub mod order;
pub mod output;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{PdfFuseError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
