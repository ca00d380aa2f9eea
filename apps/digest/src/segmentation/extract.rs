//! Raw document bytes → per-page text.

use thiserror::Error;
use tracing::debug;

use crate::models::PageText;

const PAGE_BREAK: char = '\x0C';

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Document could not be parsed: {0}")]
    Unreadable(String),

    #[error("Document is encrypted")]
    Encrypted,

    #[error("Document is neither a PDF nor valid UTF-8 text")]
    InvalidEncoding,

    #[error("Extraction exceeded the {secs}s parse budget")]
    Timeout { secs: u64 },
}

/// Turns a document's bytes into page texts. Implementations are called from the
/// blocking pool and may be slow.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, filename: &str, bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError>;
}

/// PDFs via `pdf-extract`; anything else must be UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentTextExtractor;

impl TextExtractor for DocumentTextExtractor {
    fn extract(&self, filename: &str, bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError> {
        let pages = if bytes.starts_with(b"%PDF") {
            let texts = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| {
                let message = e.to_string();
                if message.to_lowercase().contains("encrypt") {
                    ExtractionError::Encrypted
                } else {
                    ExtractionError::Unreadable(message)
                }
            })?;
            join_pages(texts)
        } else {
            let text =
                String::from_utf8(bytes.to_vec()).map_err(|_| ExtractionError::InvalidEncoding)?;
            split_pages(&text)
        };

        debug!("Extracted {} pages from {}", pages.len(), filename);
        Ok(pages)
    }
}

/// Numbers per-page texts from 1. Every page but the last ends in a newline and a form
/// feed, so page boundaries survive in the concatenated text and a line never spans two
/// pages.
fn join_pages(texts: Vec<String>) -> Vec<PageText> {
    let last = texts.len().saturating_sub(1);
    texts
        .into_iter()
        .enumerate()
        .map(|(i, mut text)| {
            if i < last {
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push(PAGE_BREAK);
            }
            PageText {
                page_number: i as u32 + 1,
                text,
            }
        })
        .collect()
}

/// Splits on form feeds; each page keeps its trailing form feed so the pages
/// concatenate back to `text`. Empty text has no pages.
pub fn split_pages(text: &str) -> Vec<PageText> {
    text.split_inclusive(PAGE_BREAK)
        .enumerate()
        .map(|(i, page)| PageText {
            page_number: i as u32 + 1,
            text: page.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentText, PageRange};
    use crate::requirements::Domain;
    use crate::segmentation::Segmenter;

    #[test]
    fn test_split_pages_keeps_form_feeds() {
        let pages = split_pages("one\x0Ctwo\x0Cthree");
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].text, "one\x0C");
        assert_eq!(pages[2].page_number, 3);
        let joined: String = pages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(joined, "one\x0Ctwo\x0Cthree");
    }

    #[test]
    fn test_split_pages_empty_text() {
        assert!(split_pages("").is_empty());
    }

    #[test]
    fn test_join_pages_marks_page_breaks() {
        let pages = join_pages(vec!["Meat Dishes".to_string(), "Vegetarian Starters\n".to_string()]);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].text, "Meat Dishes\n\x0C");
        assert_eq!(pages[1].text, "Vegetarian Starters\n");
        assert_eq!(pages[1].page_number, 2);
        assert!(join_pages(Vec::new()).is_empty());
    }

    /// Minimal uncompressed PDF with one Helvetica text line per page.
    fn pdf_with_pages(lines: &[&str]) -> Vec<u8> {
        let font_id = 3 + lines.len();
        let kids: Vec<String> = (0..lines.len()).map(|i| format!("{} 0 R", 3 + i)).collect();

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), lines.len()),
        ];
        for i in 0..lines.len() {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 {font_id} 0 R >> >> /Contents {} 0 R >>",
                font_id + 1 + i
            ));
        }
        objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());
        for line in lines {
            let content = format!("BT /F1 24 Tf 72 720 Td ({line}) Tj ET");
            objects.push(format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ));
        }

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }
        let xref_at = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
        for offset in offsets {
            pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        pdf
    }

    #[test]
    fn test_pdf_pages_are_kept_apart() {
        let pdf = pdf_with_pages(&["Meat Dishes", "Vegetarian Starters"]);
        let pages = DocumentTextExtractor.extract("menu.pdf", &pdf).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].text.contains("Meat Dishes"));
        assert!(!pages[0].text.contains("Vegetarian"));
        assert!(pages[1].text.contains("Vegetarian Starters"));

        let doc = DocumentText {
            document_id: "menu.pdf".to_string(),
            document_index: 0,
            pages,
        };
        let sections = Segmenter::for_domain(Domain::Recipe).segment(&doc);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Meat Dishes");
        assert_eq!(sections[0].page_range, PageRange::single(1));
        assert_eq!(sections[1].title, "Vegetarian Starters");
        assert_eq!(sections[1].page_range, PageRange::single(2));
    }

    #[test]
    fn test_plain_text_passthrough() {
        let pages = DocumentTextExtractor
            .extract("notes.txt", b"Meat Dishes\nBeef stew.\n")
            .unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text, "Meat Dishes\nBeef stew.\n");
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let err = DocumentTextExtractor
            .extract("blob.bin", &[0xff, 0xfe, 0x00, 0x81])
            .unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidEncoding));
    }

    #[test]
    fn test_corrupt_pdf_is_an_error() {
        let result = std::panic::catch_unwind(|| {
            DocumentTextExtractor.extract("broken.pdf", b"%PDF-1.7\nnot really a pdf")
        });
        // pdf-extract may panic on garbage; either way no text comes back
        assert!(!matches!(result, Ok(Ok(_))));
    }
}
