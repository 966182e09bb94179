//! Integration tests for error handling and edge cases.

use pdffuse::config::{Config, Limits, OrderMode, OverwriteMode, ReportFormat};
use pdffuse::error::PdfFuseError;
use pdffuse::io::PdfReader;
use pdffuse::merge::Merger;
use pdffuse::order::MergeOrder;
use pdffuse::validation::Validator;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::write_pdf;

#[tokio::test]
async fn test_missing_input() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = vec![
        write_pdf(temp_dir.path(), "a.pdf", "A", 1),
        temp_dir.path().join("missing.pdf"),
    ];

    let err = Validator::default()
        .validate_inputs(&inputs)
        .await
        .unwrap_err();

    assert!(matches!(err, PdfFuseError::FileNotFound { .. }));
    assert!(err.is_input_error());
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_not_a_pdf_names_the_input() {
    let temp_dir = TempDir::new().unwrap();
    let junk = temp_dir.path().join("junk.pdf");
    std::fs::write(&junk, b"this is not a pdf at all").unwrap();
    let inputs = vec![write_pdf(temp_dir.path(), "a.pdf", "A", 1), junk];

    let err = PdfReader::new()
        .load_ordered(&inputs, 2)
        .await
        .unwrap_err();

    match err {
        PdfFuseError::FailedToLoadPdf { ref name, .. } => assert_eq!(name, "junk.pdf"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_upload_ceiling() {
    let temp_dir = TempDir::new().unwrap();
    let big_a = temp_dir.path().join("a.pdf");
    let big_b = temp_dir.path().join("b.pdf");
    std::fs::write(&big_a, vec![b' '; 700 * 1024]).unwrap();
    std::fs::write(&big_b, vec![b' '; 700 * 1024]).unwrap();

    let validator = Validator::new(Limits::new(1, 2000));
    let err = validator
        .validate_inputs(&[big_a, big_b])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PdfFuseError::TotalSizeExceeded { total, limit }
            if total == 1400 * 1024 && limit == 1024 * 1024
    ));
    assert!(err.to_string().contains("Total input size too large"));
}

#[tokio::test]
async fn test_page_ceiling() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = vec![
        write_pdf(temp_dir.path(), "a.pdf", "A", 2),
        write_pdf(temp_dir.path(), "b.pdf", "B", 2),
    ];
    let sources = PdfReader::new().load_ordered(&inputs, 2).await.unwrap();

    let err = Merger::new(3).merge(&sources).err().unwrap();

    assert!(matches!(
        err,
        PdfFuseError::TooManyPages { total: 4, limit: 3 }
    ));
}

#[tokio::test]
async fn test_invalid_explicit_order() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = vec![
        write_pdf(temp_dir.path(), "a.pdf", "A", 1),
        write_pdf(temp_dir.path(), "b.pdf", "B", 1),
    ];
    let sources = PdfReader::new().load_ordered(&inputs, 2).await.unwrap();
    let names: Vec<String> = sources.iter().map(|s| s.name.clone()).collect();

    let result = MergeOrder::resolve(&OrderMode::Explicit(vec![2, 2]), &names);

    assert!(matches!(result, Err(PdfFuseError::InvalidOrder { .. })));
}

#[test]
fn test_config_needs_two_inputs() {
    let config = Config {
        inputs: vec![PathBuf::from("a.pdf")],
        output: PathBuf::from("out.pdf"),
        dry_run: false,
        verbose: false,
        overwrite_mode: OverwriteMode::Force,
        quiet: true,
        allow_single: false,
        order: OrderMode::AsGiven,
        limits: Limits::default(),
        compression: None,
        report: ReportFormat::Text,
        jobs: None,
    };

    let err = PdfFuseError::from(config.validate().unwrap_err());
    assert!(matches!(
        err,
        PdfFuseError::NotEnoughFiles {
            required: 2,
            given: 1
        }
    ));
}

#[tokio::test]
async fn test_output_directory_must_exist() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config {
        inputs: vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
        output: temp_dir.path().join("missing").join("out.pdf"),
        dry_run: false,
        verbose: false,
        overwrite_mode: OverwriteMode::Force,
        quiet: true,
        allow_single: false,
        order: OrderMode::AsGiven,
        limits: Limits::default(),
        compression: None,
        report: ReportFormat::Text,
        jobs: None,
    };

    assert!(Validator::default().validate_output(&config).await.is_err());
}
