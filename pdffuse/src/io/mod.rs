//! I/O operations for pdffuse.
//!
//! This module handles all file I/O operations including:
//! - Reading and parsing input PDFs, in order, with bounded concurrency
//! - Writing the final document atomically
//!
//! # Examples
//!
//! ```no_run
//! use pdffuse::io::{PdfReader, PdfWriter};
//! use std::path::{Path, PathBuf};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let source = reader.load(&PathBuf::from("input.pdf")).await?;
//! println!("{} has {} pages", source.name, source.page_count);
//!
//! let writer = PdfWriter::new();
//! writer.write(b"%PDF-1.5 ...", Path::new("copy.pdf")).await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{LoadStatistics, PdfReader, SourcePdf};
pub use writer::{PdfWriter, WriteStatistics};
