use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::document::DocumentInput;
use crate::models::section::{PageRange, ScoreBreakdown};
use crate::requirements::{Domain, ProfileSignals};

/// One collection to rank: who is asking, what they need, and the documents.
#[derive(Debug, Clone)]
pub struct CollectionInput {
    pub persona: String,
    pub job_to_be_done: String,
    pub documents: Vec<DocumentInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedSectionRecord {
    pub document_id: String,
    pub title: String,
    pub rank: usize,
    pub page_range: PageRange,
    pub relevance_score: f64,
    pub breakdown: ScoreBreakdown,
    pub relevance_factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedSubsectionRecord {
    pub document_id: String,
    pub parent_section_title: String,
    pub text_span: String,
    pub refined_text: String,
    pub page_number: u32,
    pub rank: usize,
    pub relevance_score: f64,
    pub breakdown: ScoreBreakdown,
}

/// A document that was dropped from the pool, and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub filename: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMetadata {
    pub run_id: Uuid,
    pub input_documents: Vec<String>,
    pub failed_documents: Vec<DocumentFailure>,
    pub persona: String,
    pub job_to_be_done: String,
    pub domain: Domain,
    pub signals: ProfileSignals,
    pub processing_timestamp: DateTime<Utc>,
}

/// The ranked digest for one collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionOutput {
    pub metadata: CollectionMetadata,
    pub ranked_sections: Vec<RankedSectionRecord>,
    pub ranked_subsections: Vec<RankedSubsectionRecord>,
}
