//! services/api/src/adapters/pdf.rs
//!
//! This module contains the adapter for document ingestion. It implements the
//! `DocumentTextService` port by pulling the text layer out of an uploaded
//! PDF with the `pdf-extract` crate.

use health_advisor_core::ports::{DocumentTextService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Extracts concatenated page text from a PDF byte stream, truncated to a
/// fixed character budget before it goes anywhere near the AI gateway.
#[derive(Clone)]
pub struct PdfTextAdapter {
    char_budget: usize,
}

impl PdfTextAdapter {
    /// Creates a new `PdfTextAdapter` with the given character budget.
    pub fn new(char_budget: usize) -> Self {
        Self { char_budget }
    }
}

/// Cuts `text` down to at most `budget` characters on a char boundary.
fn truncate_chars(text: String, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text,
    }
}

//=========================================================================================
// `DocumentTextService` Trait Implementation
//=========================================================================================

impl DocumentTextService for PdfTextAdapter {
    fn extract_text(&self, bytes: &[u8]) -> PortResult<String> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| PortError::DocumentUnreadable(e.to_string()))?;

        let text = pages.join("\n");
        if text.trim().is_empty() {
            return Err(PortError::DocumentUnreadable(
                "The document contains no extractable text".to_string(),
            ));
        }

        Ok(truncate_chars(text, self.char_budget))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generate a valid PDF with text using lopdf (the library that
    /// pdf-extract uses internally).
    fn make_test_pdf(text: &str) -> Vec<u8> {
        use lopdf::dictionary;
        use lopdf::{Document, Object, Stream};

        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let content = format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET");
        let content_stream = Stream::new(dictionary! {}, content.into_bytes());
        let content_id = doc.add_object(content_stream);

        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        };

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });

        if let Ok(page) = doc.get_object_mut(page_id) {
            if let Object::Dictionary(ref mut dict) = page {
                dict.set("Parent", pages_id);
            }
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });

        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn extracts_text_from_digital_pdf() {
        let adapter = PdfTextAdapter::new(8000);
        let pdf_bytes = make_test_pdf("Hemoglobin 13.5 within reference range");
        let text = adapter.extract_text(&pdf_bytes).unwrap();
        assert!(
            text.contains("Hemoglobin") || text.contains("reference"),
            "unexpected extraction output: {text}"
        );
    }

    #[test]
    fn invalid_pdf_is_document_unreadable() {
        let adapter = PdfTextAdapter::new(8000);
        let result = adapter.extract_text(b"not a pdf");
        assert!(matches!(result, Err(PortError::DocumentUnreadable(_))));
    }

    #[test]
    fn output_respects_char_budget() {
        let adapter = PdfTextAdapter::new(10);
        let pdf_bytes = make_test_pdf("A fairly long line of laboratory text");
        let text = adapter.extract_text(&pdf_bytes).unwrap();
        assert!(text.chars().count() <= 10, "got {} chars", text.chars().count());
    }

    #[test]
    fn truncation_lands_on_char_boundary() {
        let truncated = truncate_chars("héllo wörld".to_string(), 6);
        assert_eq!(truncated, "héllo ");
        let untouched = truncate_chars("short".to_string(), 10);
        assert_eq!(untouched, "short");
    }
}
