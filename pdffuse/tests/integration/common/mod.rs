//! Shared helpers for integration tests.
//!
//! PDFs are generated with lopdf at test time. Each page shows
//! `"<label> <page number>"` so tests can check page order after a merge.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::path::{Path, PathBuf};

/// Build a document with `pages` pages. `filler` extra text lines per page
/// make the content streams larger (and very compressible).
pub fn build_pdf(label: &str, pages: usize, filler: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for i in 1..=pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(format!("{label} {i}"))]),
            Operation::new("ET", vec![]),
        ];
        for line in 0..filler {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 8.into()]));
            operations.push(Operation::new(
                "Td",
                vec![72.into(), (680 - (line % 80) as i64 * 8).into()],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal("lorem ipsum dolor sit amet")],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            Content { operations }.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Serialize a document without compressing it.
pub fn to_bytes(mut doc: Document) -> Vec<u8> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Bytes of a small document.
pub fn pdf_bytes(label: &str, pages: usize) -> Vec<u8> {
    to_bytes(build_pdf(label, pages, 0))
}

/// Write a small document to `dir/name`.
pub fn write_pdf(dir: &Path, name: &str, label: &str, pages: usize) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, pdf_bytes(label, pages)).unwrap();
    path
}

/// Page contents of `doc`, in page order.
pub fn page_texts(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .into_values()
        .map(|id: ObjectId| String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned())
        .collect()
}

/// Labels shown on the pages of `doc`, e.g. `["A 1", "A 2", "B 1"]`.
pub fn page_labels(doc: &Document) -> Vec<String> {
    page_texts(doc)
        .iter()
        .filter_map(|text| {
            let start = text.find('(')? + 1;
            let end = start + text[start..].find(')')?;
            Some(text[start..end].to_string())
        })
        .collect()
}
