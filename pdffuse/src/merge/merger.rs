//! Core merge implementation.
//!
//! Every page of every source is appended, in order, under a single new
//! page tree. Object ids of each source are shifted past the ids already
//! in use so nothing collides.

use lopdf::{Document, Object, ObjectId, dictionary};
use std::time::{Duration, Instant};

use crate::error::{PdfFuseError, Result};
use crate::io::SourcePdf;
use crate::merge::forms::FormCollector;
use crate::merge::pages;
use crate::utils::format_file_size;
use crate::validation::check_page_total;

/// Statistics about a merge operation.
#[derive(Debug, Clone)]
pub struct MergeStatistics {
    /// Number of PDFs merged.
    pub files_merged: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Total size of the inputs in bytes.
    pub input_size: u64,

    /// Number of top-level form fields carried over.
    pub form_fields: usize,

    /// Time taken to merge.
    pub merge_time: Duration,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

/// Result of a merge operation.
pub struct MergeResult {
    /// The merged PDF document.
    pub document: Document,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,
}

impl MergeResult {
    /// Serialize the merged document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written out.
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.document.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

/// PDF merger that combines documents under a page ceiling.
#[derive(Debug, Clone)]
pub struct Merger {
    max_pages: usize,
}

impl Merger {
    /// Create a merger that refuses to go above `max_pages` pages.
    pub fn new(max_pages: usize) -> Self {
        Self { max_pages }
    }

    /// Merge `sources` in the order given.
    ///
    /// Sources are not modified. Form fields of all sources end up in one
    /// `/AcroForm` with `NeedAppearances` set.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `sources` is empty
    /// - The running page total goes above the ceiling
    /// - A page tree cannot be read
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdffuse::merge::Merger;
    /// # use pdffuse::io::SourcePdf;
    /// # fn example(sources: Vec<SourcePdf>) -> Result<(), Box<dyn std::error::Error>> {
    /// let result = Merger::new(2000).merge(&sources)?;
    /// println!("Merged {} files into {} pages",
    ///          result.statistics.files_merged,
    ///          result.statistics.total_pages);
    /// let bytes = result.into_bytes()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn merge(&self, sources: &[SourcePdf]) -> Result<MergeResult> {
        if sources.is_empty() {
            return Err(PdfFuseError::NotEnoughFiles {
                required: 1,
                given: 0,
            });
        }

        let start = Instant::now();

        let mut merged = Document::with_version(merged_version(sources));
        let pages_id = merged.new_object_id();
        let mut kids: Vec<Object> = Vec::new();
        let mut forms = FormCollector::new();
        let mut running_total = 0;

        for source in sources {
            running_total += source.page_count;
            check_page_total(running_total, self.max_pages)?;

            let mut doc = source.document.clone();
            doc.renumber_objects_with(merged.max_id + 1);

            let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
            for &page_id in &page_ids {
                pages::adopt_page(&mut doc, page_id, pages_id)?;
            }
            forms.collect(&doc);

            tracing::debug!(
                name = %source.name,
                pages = page_ids.len(),
                "appended source"
            );

            merged.max_id = doc.max_id;
            merged.objects.extend(doc.objects);
            kids.extend(page_ids.into_iter().map(Object::Reference));
        }

        let total_pages = kids.len();
        let form_fields = forms.field_count();

        merged.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => total_pages as i64,
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if let Some(form) = forms.into_acro_form() {
            catalog.set("AcroForm", form);
        }
        let catalog_id = merged.add_object(catalog);
        merged.trailer.set("Root", catalog_id);

        // Old catalogs and page tree nodes are no longer reachable.
        merged.prune_objects();
        merged.renumber_objects();

        let statistics = MergeStatistics {
            files_merged: sources.len(),
            total_pages,
            input_size: sources.iter().map(|s| s.file_size).sum(),
            form_fields,
            merge_time: start.elapsed(),
        };

        Ok(MergeResult {
            document: merged,
            statistics,
        })
    }
}

/// The highest header version among the sources.
fn merged_version(sources: &[SourcePdf]) -> String {
    sources
        .iter()
        .map(|s| s.document.version.as_str())
        .max_by(|a, b| version_key(a).cmp(&version_key(b)))
        .unwrap_or("1.5")
        .to_string()
}

fn version_key(version: &str) -> (u32, u32) {
    let mut parts = version.split('.').map(|p| p.trim().parse().unwrap_or(0));
    (parts.next().unwrap_or(0), parts.next().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::PdfReader;
    use crate::io::reader::fixtures::{pdf_bytes, pdf_with_pages, to_bytes};
    use rstest::rstest;

    fn source(label: &str, pages: usize) -> SourcePdf {
        PdfReader::new()
            .parse(&format!("{label}.pdf"), &pdf_bytes(label, pages))
            .unwrap()
    }

    fn page_text(doc: &Document, page_id: ObjectId) -> String {
        String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
    }

    #[test]
    fn test_merge_two_pdfs() {
        let sources = vec![source("A", 2), source("B", 3)];

        let result = Merger::new(2000).merge(&sources).unwrap();

        assert_eq!(result.statistics.files_merged, 2);
        assert_eq!(result.statistics.total_pages, 5);
        assert_eq!(
            result.statistics.input_size,
            sources.iter().map(|s| s.file_size).sum::<u64>()
        );
        assert_eq!(result.document.get_pages().len(), 5);
    }

    #[test]
    fn test_merge_keeps_order() {
        let sources = vec![source("B", 1), source("A", 2)];
        let doc = Merger::new(2000).merge(&sources).unwrap().document;

        let texts: Vec<String> = doc
            .get_pages()
            .into_values()
            .map(|id| page_text(&doc, id))
            .collect();

        assert!(texts[0].contains("(B 1)"));
        assert!(texts[1].contains("(A 1)"));
        assert!(texts[2].contains("(A 2)"));
    }

    #[test]
    fn test_merged_pages_are_self_contained() {
        let sources = vec![source("A", 1), source("B", 1)];
        let doc = Merger::new(2000).merge(&sources).unwrap().document;
        let root_pages = doc
            .catalog()
            .and_then(|c| c.get(b"Pages"))
            .and_then(Object::as_reference)
            .unwrap();

        for page_id in doc.get_pages().into_values() {
            let page = doc.get_dictionary(page_id).unwrap();
            assert_eq!(
                page.get(b"Parent").and_then(Object::as_reference).unwrap(),
                root_pages
            );
            assert!(page.has(b"MediaBox"));
            assert!(page.has(b"Resources"));
        }
    }

    #[test]
    fn test_merge_does_not_modify_sources() {
        let sources = vec![source("A", 2), source("B", 1)];
        let before: Vec<usize> = sources.iter().map(|s| s.document.objects.len()).collect();

        Merger::new(2000).merge(&sources).unwrap();

        let after: Vec<usize> = sources.iter().map(|s| s.document.objects.len()).collect();
        assert_eq!(before, after);
        assert_eq!(sources[0].document.get_pages().len(), 2);
    }

    #[rstest]
    #[case(5, true)]
    #[case(4, false)]
    #[case(2, false)]
    fn test_page_ceiling(#[case] max_pages: usize, #[case] ok: bool) {
        let sources = vec![source("A", 2), source("B", 3)];
        let result = Merger::new(max_pages).merge(&sources);

        if ok {
            assert!(result.is_ok());
        } else {
            assert!(matches!(result, Err(PdfFuseError::TooManyPages { .. })));
        }
    }

    #[test]
    fn test_page_ceiling_reports_running_total() {
        let sources = vec![source("A", 2), source("B", 3), source("C", 1)];
        let result = Merger::new(4).merge(&sources);

        assert!(matches!(
            result,
            Err(PdfFuseError::TooManyPages { total: 5, limit: 4 })
        ));
    }

    #[test]
    fn test_merge_empty_is_rejected() {
        assert!(matches!(
            Merger::new(2000).merge(&[]),
            Err(PdfFuseError::NotEnoughFiles { .. })
        ));
    }

    #[test]
    fn test_form_fields_are_carried() {
        let mut doc = pdf_with_pages("F", 1);
        let field = doc.add_object(dictionary! {
            "FT" => "Tx",
            "T" => Object::string_literal("email"),
        });
        doc.catalog_mut()
            .unwrap()
            .set("AcroForm", dictionary! { "Fields" => vec![field.into()] });
        let with_form = PdfReader::new().parse("form.pdf", &to_bytes(doc)).unwrap();

        let result = Merger::new(2000)
            .merge(&[source("A", 1), with_form])
            .unwrap();
        assert_eq!(result.statistics.form_fields, 1);

        let form = result
            .document
            .catalog()
            .and_then(|c| c.get(b"AcroForm"))
            .and_then(Object::as_dict)
            .unwrap();
        assert!(form.get(b"NeedAppearances").unwrap().as_bool().unwrap());

        let field_ref = form.get(b"Fields").unwrap().as_array().unwrap()[0]
            .as_reference()
            .unwrap();
        let field = result.document.get_dictionary(field_ref).unwrap();
        assert_eq!(field.get(b"T").unwrap().as_str().unwrap(), b"email");
    }

    #[test]
    fn test_into_bytes_reloads() {
        let result = Merger::new(2000)
            .merge(&[source("A", 1), source("B", 2)])
            .unwrap();

        let bytes = result.into_bytes().unwrap();
        let reloaded = Document::load_mem(&bytes).unwrap();

        assert_eq!(reloaded.get_pages().len(), 3);
    }

    #[rstest]
    #[case("1.4", "1.7", "1.7")]
    #[case("1.10", "1.9", "1.10")]
    #[case("2.0", "1.7", "2.0")]
    fn test_merged_version(#[case] a: &str, #[case] b: &str, #[case] expected: &str) {
        let mut first = source("A", 1);
        let mut second = source("B", 1);
        first.document.version = a.to_string();
        second.document.version = b.to_string();

        assert_eq!(merged_version(&[first, second]), expected);
    }

    #[test]
    fn test_merge_statistics() {
        let stats = MergeStatistics {
            files_merged: 3,
            total_pages: 15,
            input_size: 1024 * 1024,
            form_fields: 0,
            merge_time: Duration::from_secs(2),
        };

        assert_eq!(stats.format_input_size(), "1.00 MB");
    }
}
