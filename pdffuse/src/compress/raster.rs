//! Rasterization through poppler's `pdftoppm`.
//!
//! Pages are rendered to PNG files in a scratch directory, then re-encoded
//! as JPEG and wrapped into a new document with one full-page image per
//! page. The result has no extractable text.

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use super::{CollaboratorError, ColorMode, Rasterizer};

/// PostScript points per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Pages rendered at one resolution and color mode.
///
/// Owns the scratch directory holding the page images, which is removed
/// when this value is dropped.
#[derive(Debug)]
pub struct RenderedPages {
    resolution: u32,
    color_mode: ColorMode,
    files: Vec<PathBuf>,
    _workdir: Option<TempDir>,
}

impl RenderedPages {
    /// Wrap already rendered page images, in page order.
    pub fn new(resolution: u32, color_mode: ColorMode, files: Vec<PathBuf>) -> Self {
        Self {
            resolution,
            color_mode,
            files,
            _workdir: None,
        }
    }

    fn in_workdir(
        resolution: u32,
        color_mode: ColorMode,
        files: Vec<PathBuf>,
        workdir: TempDir,
    ) -> Self {
        Self {
            _workdir: Some(workdir),
            ..Self::new(resolution, color_mode, files)
        }
    }

    /// Resolution the pages were rendered at.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Color mode the pages were rendered in.
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Page image files, in page order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of rendered pages.
    pub fn page_count(&self) -> usize {
        self.files.len()
    }
}

/// Rasterizer backed by the `pdftoppm` program.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    program: PathBuf,
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PdftoppmRasterizer {
    /// Use `pdftoppm` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("pdftoppm")
    }

    /// Use a specific `pdftoppm` binary.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check whether the program can be started.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program).arg("-v").output().is_ok()
    }

    fn run(
        &self,
        input: &Path,
        resolution: u32,
        color_mode: ColorMode,
        prefix: &Path,
    ) -> Result<(), CollaboratorError> {
        let mut command = Command::new(&self.program);
        command.arg("-r").arg(resolution.to_string());
        if color_mode.is_grayscale() {
            command.arg("-gray");
        }
        command.arg("-png").arg(input).arg(prefix);

        let output = command.output().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                CollaboratorError::Unavailable(format!(
                    "{} not found, install poppler-utils to enable rasterization",
                    self.program.display()
                ))
            } else {
                CollaboratorError::Failed(format!(
                    "failed to execute {}: {e}",
                    self.program.display()
                ))
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CollaboratorError::Failed(format!(
                "{} failed (exit code {}): {}",
                self.program.display(),
                output
                    .status
                    .code()
                    .map_or_else(|| "unknown".to_string(), |c| c.to_string()),
                stderr.trim()
            )));
        }

        Ok(())
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn render(
        &self,
        input: &[u8],
        resolution: u32,
        color_mode: ColorMode,
    ) -> Result<RenderedPages, CollaboratorError> {
        let workdir = TempDir::new().map_err(failed)?;
        let input_path = workdir.path().join("input.pdf");
        std::fs::write(&input_path, input).map_err(failed)?;

        let prefix = workdir.path().join("page");
        self.run(&input_path, resolution, color_mode, &prefix)?;

        let files = collect_page_files(workdir.path()).map_err(failed)?;
        if files.is_empty() {
            return Err(CollaboratorError::Failed("no pages were rendered".to_string()));
        }

        tracing::debug!(resolution, %color_mode, pages = files.len(), "rendered pages");

        Ok(RenderedPages::in_workdir(resolution, color_mode, files, workdir))
    }

    fn assemble(&self, pages: &RenderedPages, quality: u32) -> Result<Vec<u8>, CollaboratorError> {
        let quality = quality.clamp(1, 100) as u8;
        let mut assembler = ImageDocument::new();

        for file in pages.files() {
            let image = image::open(file).map_err(|e| {
                CollaboratorError::Failed(format!("failed to read {}: {e}", file.display()))
            })?;
            let jpeg = encode_jpeg(&image, pages.color_mode(), quality)?;
            assembler.add_page(
                jpeg,
                image.width(),
                image.height(),
                pages.color_mode(),
                pages.resolution(),
            )?;
        }

        assembler.finish()
    }
}

fn failed(err: io::Error) -> CollaboratorError {
    CollaboratorError::Failed(err.to_string())
}

/// List `page-*.png` files in page order.
///
/// `pdftoppm` zero-pads page numbers to a common width, so name order is
/// page order.
fn collect_page_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_page = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("page") && n.ends_with(".png"));

        if is_page {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Encode an image as baseline JPEG in the given color mode.
pub(crate) fn encode_jpeg(
    image: &DynamicImage,
    color_mode: ColorMode,
    quality: u8,
) -> Result<Vec<u8>, CollaboratorError> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    let encoded = match color_mode {
        ColorMode::Grayscale => image.to_luma8().write_with_encoder(encoder),
        ColorMode::Color => image.to_rgb8().write_with_encoder(encoder),
    };
    encoded.map_err(|e| CollaboratorError::Failed(format!("JPEG encoding failed: {e}")))?;

    Ok(buffer)
}

/// Builds a document whose pages are single full-bleed JPEG images.
pub(crate) struct ImageDocument {
    doc: Document,
    pages_id: lopdf::ObjectId,
    kids: Vec<Object>,
}

impl ImageDocument {
    pub(crate) fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Append a page sized so the image prints at `resolution` DPI.
    pub(crate) fn add_page(
        &mut self,
        jpeg: Vec<u8>,
        width: u32,
        height: u32,
        color_mode: ColorMode,
        resolution: u32,
    ) -> Result<(), CollaboratorError> {
        let color_space = match color_mode {
            ColorMode::Grayscale => "DeviceGray",
            ColorMode::Color => "DeviceRGB",
        };

        let mut image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => color_space,
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        );
        image.allows_compression = false;
        let image_id = self.doc.add_object(image);

        let page_width = width as f32 * POINTS_PER_INCH / resolution as f32;
        let page_height = height as f32 * POINTS_PER_INCH / resolution as f32;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        page_width.into(),
                        0.into(),
                        0.into(),
                        page_height.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| CollaboratorError::Failed(format!("failed to encode page content: {e}")))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), page_width.into(), page_height.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
        });
        self.kids.push(page_id.into());

        Ok(())
    }

    /// Close the page tree and serialize.
    pub(crate) fn finish(mut self) -> Result<Vec<u8>, CollaboratorError> {
        if self.kids.is_empty() {
            return Err(CollaboratorError::Failed("no pages to assemble".to_string()));
        }

        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut output = Vec::new();
        self.doc
            .save_to(&mut output)
            .map_err(|e| CollaboratorError::Failed(format!("failed to save rasterized PDF: {e}")))?;

        Ok(output)
    }
}
