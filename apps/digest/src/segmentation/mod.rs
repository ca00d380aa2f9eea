//! Structural segmentation: document bytes → page text → titled sections.

pub mod extract;
pub mod heading;
pub mod segmenter;

pub use extract::{DocumentTextExtractor, ExtractionError, TextExtractor};
pub use segmenter::Segmenter;
