//! Relevance scoring of sections and refinement into ranked subsections.

pub mod refiner;
pub mod scorer;
pub mod vector_space;

pub use refiner::refine;
pub use scorer::{rank_sections, ScoringWeights};
