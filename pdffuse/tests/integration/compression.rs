//! Compression of merged documents, with scripted and real rasterizers.

use lopdf::Document;
use pdffuse::compress::{
    CollaboratorError, ColorMode, ColorModes, CompressOptions, CompressionMethod, Compressor,
    LopdfRepacker, PdftoppmRasterizer, Rasterizer, RenderedPages,
};
use pdffuse::io::PdfReader;
use pdffuse::merge::Merger;
use std::cell::Cell;
use std::rc::Rc;

use crate::common::{build_pdf, pdf_bytes, to_bytes};

/// Rasterizer producing `size_of(resolution, quality, mode)` bytes per cell.
struct ScriptedRasterizer {
    size_of: fn(u32, u32, ColorMode) -> usize,
    calls: Rc<Cell<usize>>,
}

impl ScriptedRasterizer {
    fn new(size_of: fn(u32, u32, ColorMode) -> usize) -> Self {
        Self {
            size_of,
            calls: Rc::default(),
        }
    }
}

impl Rasterizer for ScriptedRasterizer {
    fn render(
        &self,
        _input: &[u8],
        resolution: u32,
        color_mode: ColorMode,
    ) -> Result<RenderedPages, CollaboratorError> {
        self.calls.set(self.calls.get() + 1);
        Ok(RenderedPages::new(resolution, color_mode, Vec::new()))
    }

    fn assemble(&self, pages: &RenderedPages, quality: u32) -> Result<Vec<u8>, CollaboratorError> {
        self.calls.set(self.calls.get() + 1);
        Ok(vec![
            b'R';
            (self.size_of)(pages.resolution(), quality, pages.color_mode())
        ])
    }
}

fn cell_size(resolution: u32, quality: u32, color_mode: ColorMode) -> usize {
    let extra = if color_mode.is_grayscale() { 0 } else { 50 };
    (resolution + quality) as usize + extra
}

/// A merged document whose content streams are large and uncompressed.
fn bulky_merge() -> Vec<u8> {
    let reader = PdfReader::new();
    let sources = vec![
        reader
            .parse("a.pdf", &to_bytes(build_pdf("A", 2, 300)))
            .unwrap(),
        reader
            .parse("b.pdf", &to_bytes(build_pdf("B", 2, 300)))
            .unwrap(),
    ];

    Merger::new(2000)
        .merge(&sources)
        .unwrap()
        .into_bytes()
        .unwrap()
}

#[test]
fn test_lossless_reaches_target_without_rasterizing() {
    let merged = bulky_merge();
    let rasterizer = ScriptedRasterizer::new(cell_size);
    let calls = Rc::clone(&rasterizer.calls);
    let compressor = Compressor::new(LopdfRepacker::new(), rasterizer);

    let options = CompressOptions::with_target(merged.len() as u64 / 2);
    let result = compressor.compress(&merged, &options).unwrap();

    assert_eq!(result.method, CompressionMethod::Lossless);
    assert!(result.target_met);
    assert!(result.attempts.is_empty());
    assert_eq!(calls.get(), 0);
    assert_eq!(result.size_before, merged.len() as u64);
    assert_eq!(result.size_after, result.final_bytes.len() as u64);

    let reloaded = Document::load_mem(&result.final_bytes).unwrap();
    assert_eq!(reloaded.get_pages().len(), 4);
}

#[test]
fn test_first_fit_in_grid_order() {
    let merged = bulky_merge();
    let compressor = Compressor::new(LopdfRepacker::new(), ScriptedRasterizer::new(cell_size));

    // Grayscale at 150 DPI: 235, 225, 210, 200 bytes for 85, 75, 60, 50.
    let result = compressor
        .compress(&merged, &CompressOptions::with_target(200))
        .unwrap();

    assert_eq!(
        result.method,
        CompressionMethod::Rasterize {
            resolution: 150,
            quality: 50,
            grayscale: true,
            best_effort: false,
        }
    );
    assert!(result.target_met);
    assert_eq!(result.size_after, 200);
    assert_eq!(result.attempts.len(), 4);
}

#[test]
fn test_best_effort_when_target_unreachable() {
    let merged = bulky_merge();
    let compressor = Compressor::new(LopdfRepacker::new(), ScriptedRasterizer::new(cell_size));

    let result = compressor
        .compress(&merged, &CompressOptions::with_target(10))
        .unwrap();

    assert_eq!(
        result.method,
        CompressionMethod::Rasterize {
            resolution: 60,
            quality: 30,
            grayscale: true,
            best_effort: true,
        }
    );
    assert!(!result.target_met);
    assert_eq!(result.size_after, 90);
    assert_eq!(result.attempts.len(), 2 * 7 * 6);
}

#[test]
fn test_color_only_skips_grayscale() {
    let merged = bulky_merge();
    let compressor = Compressor::new(LopdfRepacker::new(), ScriptedRasterizer::new(cell_size));

    let options = CompressOptions {
        color_modes: ColorModes::ColorOnly,
        ..CompressOptions::with_target(250)
    };
    let result = compressor.compress(&merged, &options).unwrap();

    // Color at 150 DPI: 285, 275, 260, 250.
    assert_eq!(
        result.method,
        CompressionMethod::Rasterize {
            resolution: 150,
            quality: 50,
            grayscale: false,
            best_effort: false,
        }
    );
    assert!(
        result
            .attempts
            .iter()
            .all(|attempt| attempt.color_mode == ColorMode::Color)
    );
}

#[test]
fn test_missing_rasterizer_keeps_lossless_result() {
    let merged = bulky_merge();
    let compressor = Compressor::new(
        LopdfRepacker::new(),
        PdftoppmRasterizer::with_program("/nonexistent/pdftoppm"),
    );

    let result = compressor
        .compress(&merged, &CompressOptions::with_target(1))
        .unwrap();

    assert_eq!(result.method, CompressionMethod::Lossless);
    assert!(!result.target_met);
    assert!(result.attempts.is_empty());
    assert!(result.size_after < result.size_before);

    let reloaded = Document::load_mem(&result.final_bytes).unwrap();
    assert_eq!(reloaded.get_pages().len(), 4);
}

#[test]
fn test_pdftoppm_rasterizes_every_page() {
    let rasterizer = PdftoppmRasterizer::new();
    if !rasterizer.is_available() {
        eprintln!("pdftoppm not installed, skipping");
        return;
    }

    let input = pdf_bytes("Scan", 3);
    let output = rasterizer
        .rasterize(&input, 36, 40, ColorMode::Grayscale)
        .unwrap();

    let doc = Document::load_mem(&output).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
    assert!(doc.extract_text(&[1]).unwrap_or_default().trim().is_empty());
}
