use std::fmt;

use serde::{Deserialize, Serialize};

/// Which heading rule promoted a line to a section title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingKind {
    Numbered,
    Uppercase,
    Keyword,
    Formatting,
}

/// Identifies a section within one collection: document order, then position in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SectionId {
    pub document_index: usize,
    pub ordinal: usize,
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.document_index, self.ordinal)
    }
}

/// 1-based inclusive page span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn single(page: u32) -> Self {
        Self {
            start: page,
            end: page,
        }
    }
}

/// A titled structural unit of a document.
///
/// `heading_text` and `raw_text` are verbatim slices of the extracted text, so the
/// sections of a document concatenated in ordinal order reproduce it exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub document_id: String,
    pub document_index: usize,
    pub ordinal: usize,
    pub title: String,
    /// None for the implicit "Untitled" section.
    pub heading_kind: Option<HeadingKind>,
    pub heading_text: String,
    pub raw_text: String,
    pub page_range: PageRange,
    pub word_count: usize,
}

impl Section {
    pub fn id(&self) -> SectionId {
        SectionId {
            document_index: self.document_index,
            ordinal: self.ordinal,
        }
    }
}

/// Per-component contributions behind a relevance score, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub similarity: f64,
    pub title_match: f64,
    pub length_fit: f64,
}

/// A section with its position in the collection-wide ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSection {
    pub section: Section,
    pub relevance_score: f64,
    pub rank: usize,
    pub breakdown: ScoreBreakdown,
    /// Readable reasons for the score, e.g. "Title matches: vegetarian".
    pub relevance_factors: Vec<String>,
}

/// Byte range into the parent section's `raw_text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// A paragraph or sentence window cut from one of the top-ranked sections.
/// `rank` is local to the refined pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubSection {
    pub parent_section_id: SectionId,
    pub document_id: String,
    pub parent_title: String,
    pub span: TextSpan,
    pub text_span: String,
    pub refined_text: String,
    pub page_number: u32,
    pub local_ordinal: usize,
    pub relevance_score: f64,
    pub rank: usize,
    pub breakdown: ScoreBreakdown,
}
