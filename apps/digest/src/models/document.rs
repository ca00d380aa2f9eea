use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A raw document as handed over by the caller: a name and its bytes.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub filename: String,
    pub content: Bytes,
}

impl DocumentInput {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// Extracted text of a single page. A page keeps its trailing form feed (if any) so
/// that concatenating the pages reproduces the extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// The extracted text of one document, ready for segmentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentText {
    pub document_id: String,
    pub document_index: usize,
    pub pages: Vec<PageText>,
}

impl DocumentText {
    #[cfg(test)]
    pub fn full_text(&self) -> String {
        self.pages.iter().map(|p| p.text.as_str()).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.text.trim().is_empty())
    }
}
