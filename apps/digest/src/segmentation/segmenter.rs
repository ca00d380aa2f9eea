//! Splits extracted document text into titled sections.
//!
//! Every byte of the input ends up in exactly one section's `heading_text` or
//! `raw_text`, so segmentation never drops content.

use tracing::debug;

use crate::models::{DocumentText, HeadingKind, PageRange, Section};
use crate::requirements::Domain;
use crate::segmentation::heading::{clean_title, HeadingDetector};
use crate::text::word_count;

pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone)]
pub struct Segmenter {
    detector: HeadingDetector,
}

/// A section being filled line by line.
struct Draft {
    title: String,
    heading_kind: Option<HeadingKind>,
    heading_text: String,
    raw_text: String,
    start_page: u32,
    last_content_page: Option<u32>,
}

impl Draft {
    fn untitled(start_page: u32) -> Self {
        Self {
            title: UNTITLED.to_string(),
            heading_kind: None,
            heading_text: String::new(),
            raw_text: String::new(),
            start_page,
            last_content_page: None,
        }
    }

    fn push_body(&mut self, line: &str, page: u32) {
        self.raw_text.push_str(line);
        if !line.trim().is_empty() {
            self.last_content_page = Some(page);
        }
    }

    fn finish(self, doc: &DocumentText, ordinal: usize) -> Section {
        let page_range = match self.last_content_page {
            Some(end) if end > self.start_page => PageRange {
                start: self.start_page,
                end,
            },
            _ => PageRange::single(self.start_page),
        };
        Section {
            document_id: doc.document_id.clone(),
            document_index: doc.document_index,
            ordinal,
            title: self.title,
            heading_kind: self.heading_kind,
            heading_text: self.heading_text,
            word_count: word_count(&self.raw_text),
            raw_text: self.raw_text,
            page_range,
        }
    }
}

impl Segmenter {
    pub fn new(detector: HeadingDetector) -> Self {
        Self { detector }
    }

    pub fn for_domain(domain: Domain) -> Self {
        Self::new(HeadingDetector::for_domain(domain))
    }

    /// Returns the document's sections in order, ordinals from 0.
    ///
    /// Text before the first heading becomes an "Untitled" section, unless it is only
    /// whitespace, in which case it is kept in front of the first heading line. A document
    /// without headings yields exactly one "Untitled" section.
    pub fn segment(&self, doc: &DocumentText) -> Vec<Section> {
        let first_page = doc.pages.first().map(|p| p.page_number).unwrap_or(1);
        let mut sections = Vec::new();
        let mut current = Draft::untitled(first_page);
        let mut seen_heading = false;

        for page in &doc.pages {
            for line in page.text.split_inclusive('\n') {
                let Some(kind) = self.detector.classify(line) else {
                    current.push_body(line, page.page_number);
                    continue;
                };

                let mut heading_text = String::new();
                if seen_heading || !current.raw_text.trim().is_empty() {
                    let ordinal = sections.len();
                    let previous = std::mem::replace(&mut current, Draft::untitled(page.page_number));
                    sections.push(previous.finish(doc, ordinal));
                } else {
                    // whitespace before the first heading travels with it
                    heading_text = std::mem::take(&mut current.raw_text);
                }
                heading_text.push_str(line);

                current = Draft {
                    title: clean_title(line),
                    heading_kind: Some(kind),
                    heading_text,
                    raw_text: String::new(),
                    start_page: page.page_number,
                    last_content_page: None,
                };
                seen_heading = true;
            }
        }

        let ordinal = sections.len();
        sections.push(current.finish(doc, ordinal));

        debug!(
            "Segmented {} into {} sections",
            doc.document_id,
            sections.len()
        );
        sections
    }
}
