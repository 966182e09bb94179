//! End-to-end merges of files on disk.

use lopdf::Document;
use pdffuse::compress::{CompressOptions, CompressionMethod, Compressor};
use pdffuse::io::{PdfReader, PdfWriter};
use pdffuse::merge::Merger;
use pdffuse::utils::collect_paths_for_patterns;
use pdffuse::validation::Validator;
use tempfile::TempDir;

use crate::common::{page_labels, write_pdf};

#[tokio::test]
async fn test_merge_two_files() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(temp_dir.path(), "a.pdf", "A", 2);
    let b = write_pdf(temp_dir.path(), "b.pdf", "B", 3);
    let output = temp_dir.path().join("merged.pdf");
    let inputs = vec![a, b];

    let summary = Validator::default().validate_inputs(&inputs).await.unwrap();
    assert_eq!(summary.files_validated, 2);

    let sources = PdfReader::new().load_ordered(&inputs, 2).await.unwrap();
    let result = Merger::new(2000).merge(&sources).unwrap();
    assert_eq!(result.statistics.total_pages, 5);
    assert_eq!(result.statistics.input_size, summary.total_size);

    let bytes = result.into_bytes().unwrap();
    let stats = PdfWriter::new().write(&bytes, &output).await.unwrap();
    assert_eq!(stats.file_size, bytes.len() as u64);

    let merged = Document::load(&output).unwrap();
    assert_eq!(
        page_labels(&merged),
        vec!["A 1", "A 2", "B 1", "B 2", "B 3"]
    );
}

#[tokio::test]
async fn test_merge_glob_inputs() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(temp_dir.path(), "part-2.pdf", "Two", 1);
    write_pdf(temp_dir.path(), "part-1.pdf", "One", 1);
    write_pdf(temp_dir.path(), "part-3.pdf", "Three", 1);

    let pattern = temp_dir.path().join("part-*.pdf");
    let inputs = collect_paths_for_patterns([pattern.to_string_lossy()]).unwrap();
    assert_eq!(inputs.len(), 3);

    let sources = PdfReader::new().load_ordered(&inputs, 4).await.unwrap();
    let merged = Merger::new(2000).merge(&sources).unwrap().document;

    assert_eq!(page_labels(&merged), vec!["One 1", "Two 1", "Three 1"]);
}

#[tokio::test]
async fn test_merge_then_repack_only() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = vec![
        write_pdf(temp_dir.path(), "a.pdf", "A", 3),
        write_pdf(temp_dir.path(), "b.pdf", "B", 3),
    ];

    let sources = PdfReader::new().load_ordered(&inputs, 2).await.unwrap();
    let merged = Merger::new(2000)
        .merge(&sources)
        .unwrap()
        .into_bytes()
        .unwrap();

    let options = CompressOptions {
        try_lossy_if_over_target: false,
        ..CompressOptions::with_target(1)
    };
    let result = Compressor::default().compress(&merged, &options).unwrap();

    assert!(result.size_after <= result.size_before);
    assert!(matches!(
        result.method,
        CompressionMethod::None | CompressionMethod::Lossless
    ));
    assert!(!result.target_met);
    assert!(result.attempts.is_empty());

    let reloaded = Document::load_mem(&result.final_bytes).unwrap();
    assert_eq!(reloaded.get_pages().len(), 6);
}

#[tokio::test]
async fn test_single_input_merge() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = vec![write_pdf(temp_dir.path(), "only.pdf", "Only", 2)];

    let sources = PdfReader::new().load_ordered(&inputs, 1).await.unwrap();
    let merged = Merger::new(2000).merge(&sources).unwrap();

    assert_eq!(merged.statistics.files_merged, 1);
    assert_eq!(page_labels(&merged.document), vec!["Only 1", "Only 2"]);
}
