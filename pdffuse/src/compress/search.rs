//! Rasterization grid search.

use super::{ColorMode, CompressOptions, RasterAttempt, Rasterizer};
use crate::compress::CollaboratorError;

/// A rasterized document picked by the search.
#[derive(Debug)]
pub(crate) struct Candidate {
    pub bytes: Vec<u8>,
    pub resolution: u32,
    pub quality: u32,
    pub color_mode: ColorMode,
    pub best_effort: bool,
}

/// Walk the grid (color mode, then resolution, then quality) and return the
/// first candidate within the target, or the smallest one seen.
///
/// Every produced candidate is appended to `attempts`. Returns `None` when
/// nothing was produced or the rasterizer is unavailable.
pub(crate) fn find_candidate<R: Rasterizer + ?Sized>(
    rasterizer: &R,
    input: &[u8],
    options: &CompressOptions,
    attempts: &mut Vec<RasterAttempt>,
) -> Option<Candidate> {
    let mut smallest: Option<Candidate> = None;

    for &color_mode in options.color_modes.sequence() {
        for &resolution in &options.resolutions {
            let pages = match rasterizer.render(input, resolution, color_mode) {
                Ok(pages) => pages,
                Err(CollaboratorError::Unavailable(reason)) => {
                    tracing::warn!(%reason, "rasterizer unavailable, skipping lossy compression");
                    return None;
                }
                Err(err) => {
                    tracing::debug!(resolution, %color_mode, error = %err, "render failed");
                    continue;
                }
            };

            for &quality in &options.qualities {
                let bytes = match rasterizer.assemble(&pages, quality) {
                    Ok(bytes) => bytes,
                    Err(CollaboratorError::Unavailable(reason)) => {
                        tracing::warn!(%reason, "rasterizer unavailable, skipping lossy compression");
                        return None;
                    }
                    Err(err) => {
                        tracing::debug!(resolution, quality, %color_mode, error = %err, "encode failed");
                        continue;
                    }
                };

                let size = bytes.len() as u64;
                attempts.push(RasterAttempt {
                    resolution,
                    quality,
                    color_mode,
                    size,
                });
                tracing::debug!(resolution, quality, %color_mode, size, "raster attempt");

                let candidate = Candidate {
                    bytes,
                    resolution,
                    quality,
                    color_mode,
                    best_effort: false,
                };

                if size <= options.target_size {
                    return Some(candidate);
                }

                if smallest
                    .as_ref()
                    .is_none_or(|current| candidate.bytes.len() < current.bytes.len())
                {
                    smallest = Some(candidate);
                }
            }
        }
    }

    smallest.map(|candidate| Candidate {
        best_effort: true,
        ..candidate
    })
}
