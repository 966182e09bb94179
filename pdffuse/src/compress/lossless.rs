//! Lossless repacking with lopdf.

use lopdf::Document;

use super::{CollaboratorError, Repacker};

/// Repacker that rewrites a document without touching its content.
///
/// Unreferenced objects and empty streams are dropped, streams are
/// Flate-compressed and objects are renumbered densely before saving.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfRepacker;

impl LopdfRepacker {
    /// Create a new repacker.
    pub fn new() -> Self {
        Self
    }
}

impl Repacker for LopdfRepacker {
    fn repack(&self, input: &[u8]) -> Result<Vec<u8>, CollaboratorError> {
        let mut doc = Document::load_mem(input)
            .map_err(|e| CollaboratorError::Failed(format!("Failed to parse PDF: {e}")))?;

        doc.prune_objects();
        doc.delete_zero_length_streams();
        doc.compress();
        doc.renumber_objects();

        let mut output = Vec::with_capacity(input.len());
        doc.save_to(&mut output)
            .map_err(|e| CollaboratorError::Failed(format!("Failed to save PDF: {e}")))?;

        if output.is_empty() {
            return Err(CollaboratorError::Failed("Repack produced no output".to_string()));
        }

        Ok(output)
    }
}
