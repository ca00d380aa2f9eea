pub mod collection;
pub mod document;
pub mod section;

pub use collection::{
    CollectionInput, CollectionMetadata, CollectionOutput, DocumentFailure, RankedSectionRecord,
    RankedSubsectionRecord,
};
pub use document::{DocumentInput, DocumentText, PageText};
pub use section::{
    HeadingKind, PageRange, ScoreBreakdown, ScoredSection, Section, SubSection, TextSpan,
};
