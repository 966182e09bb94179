//! Merging loaded PDFs into one document.
//!
//! - Pages are appended in the order the sources are given
//! - Inherited page attributes are copied onto each page
//! - Form fields of all sources are kept in one `/AcroForm`
//!
//! Digital signatures do not survive a merge. Callers are expected to tell
//! the user so.

mod forms;
pub mod merger;
mod pages;

pub use merger::{MergeResult, MergeStatistics, Merger};
