//! Merge order: alphabetical, explicit, duplicates and reconciliation.

use pdffuse::config::OrderMode;
use pdffuse::io::{PdfReader, SourcePdf};
use pdffuse::merge::Merger;
use pdffuse::order::MergeOrder;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::{page_labels, write_pdf};

async fn load(paths: &[PathBuf]) -> Vec<SourcePdf> {
    PdfReader::new().load_ordered(paths, 2).await.unwrap()
}

fn names(sources: &[SourcePdf]) -> Vec<String> {
    sources.iter().map(|s| s.name.clone()).collect()
}

fn merge_labels(order: &MergeOrder, sources: Vec<SourcePdf>) -> Vec<String> {
    let sources = order.arrange(sources, |s| s.name.as_str()).unwrap();
    page_labels(&Merger::new(2000).merge(&sources).unwrap().document)
}

#[tokio::test]
async fn test_alphabetical_order() {
    let temp_dir = TempDir::new().unwrap();
    let paths = vec![
        write_pdf(temp_dir.path(), "b.pdf", "b", 1),
        write_pdf(temp_dir.path(), "C.pdf", "C", 1),
        write_pdf(temp_dir.path(), "a.pdf", "a", 1),
    ];
    let sources = load(&paths).await;

    let order = MergeOrder::resolve(&OrderMode::Alphabetical, &names(&sources)).unwrap();

    assert_eq!(order.names(), ["a.pdf", "b.pdf", "C.pdf"]);
    assert_eq!(merge_labels(&order, sources), vec!["a 1", "b 1", "C 1"]);
}

#[tokio::test]
async fn test_explicit_order() {
    let temp_dir = TempDir::new().unwrap();
    let paths = vec![
        write_pdf(temp_dir.path(), "one.pdf", "one", 1),
        write_pdf(temp_dir.path(), "two.pdf", "two", 2),
        write_pdf(temp_dir.path(), "three.pdf", "three", 1),
    ];
    let sources = load(&paths).await;

    let mode = OrderMode::parse_explicit("3,1,2").unwrap();
    let order = MergeOrder::resolve(&mode, &names(&sources)).unwrap();

    assert_eq!(
        merge_labels(&order, sources),
        vec!["three 1", "one 1", "two 1", "two 2"]
    );
}

#[tokio::test]
async fn test_duplicate_names_are_distinguished() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("first");
    let second = temp_dir.path().join("second");
    std::fs::create_dir_all(&first).unwrap();
    std::fs::create_dir_all(&second).unwrap();

    let paths = vec![
        write_pdf(&first, "scan.pdf", "first", 1),
        write_pdf(&second, "scan.pdf", "second", 1),
    ];
    let sources = load(&paths).await;
    assert_eq!(names(&sources), vec!["scan.pdf", "scan.pdf (2)"]);

    let order = MergeOrder::resolve(&OrderMode::Explicit(vec![2, 1]), &names(&sources)).unwrap();
    assert_eq!(merge_labels(&order, sources), vec!["second 1", "first 1"]);
}

#[tokio::test]
async fn test_reconcile_after_input_change() {
    let temp_dir = TempDir::new().unwrap();
    let paths = vec![
        write_pdf(temp_dir.path(), "a.pdf", "a", 1),
        write_pdf(temp_dir.path(), "c.pdf", "c", 1),
        write_pdf(temp_dir.path(), "d.pdf", "d", 1),
    ];
    let sources = load(&paths).await;

    // A previous session had b removed and d not yet added.
    let previous: Vec<String> = ["c.pdf", "b.pdf", "a.pdf"].map(String::from).to_vec();
    let order = MergeOrder::reconcile(&previous, &names(&sources));

    assert_eq!(order.names(), ["c.pdf", "a.pdf", "d.pdf"]);
    assert_eq!(merge_labels(&order, sources), vec!["c 1", "a 1", "d 1"]);
}
