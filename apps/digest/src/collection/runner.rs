//! Collection runner: drives extraction, profiling, segmentation, ranking and
//! refinement for one collection.
//!
//! Per-document extraction failures are recorded and skipped; the collection only fails
//! when documents were supplied and none of them produced any text.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{
    CollectionInput, CollectionMetadata, CollectionOutput, DocumentFailure, DocumentInput,
    DocumentText, PageText, RankedSectionRecord, RankedSubsectionRecord, ScoredSection,
    SubSection,
};
use crate::ranking::{rank_sections, refine, ScoringWeights};
use crate::requirements::{extract_profile, ExtractorSettings, RequirementProfile};
use crate::segmentation::{ExtractionError, Segmenter, TextExtractor};

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_MAX_SECTIONS: usize = 10;
pub const DEFAULT_MAX_SUBSECTIONS: usize = 20;
pub const DEFAULT_PARSE_TIMEOUT_SECS: u64 = 30;

const NO_TEXT_REASON: &str = "no extractable text";

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("None of the {documents} supplied documents yielded any text")]
    NoDocumentText { documents: usize },

    #[error("Ranking task failed: {0}")]
    TaskFailed(String),
}

/// Tunables for one collection run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Sections handed to the refiner.
    pub top_k: usize,
    /// Cap on ranked sections in the output.
    pub max_sections: usize,
    /// Cap on ranked subsections in the output.
    pub max_subsections: usize,
    pub parse_timeout: Duration,
    pub weights: ScoringWeights,
    pub extractor: ExtractorSettings,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            max_sections: DEFAULT_MAX_SECTIONS,
            max_subsections: DEFAULT_MAX_SUBSECTIONS,
            parse_timeout: Duration::from_secs(DEFAULT_PARSE_TIMEOUT_SECS),
            weights: ScoringWeights::default(),
            extractor: ExtractorSettings::default(),
        }
    }
}

#[derive(Clone)]
pub struct CollectionRunner {
    extractor: Arc<dyn TextExtractor>,
    settings: PipelineSettings,
}

impl CollectionRunner {
    pub fn new(extractor: Arc<dyn TextExtractor>, settings: PipelineSettings) -> Self {
        Self {
            extractor,
            settings,
        }
    }

    pub async fn process(&self, input: CollectionInput) -> Result<CollectionOutput, CollectionError> {
        let run_id = Uuid::new_v4();
        info!(
            "Collection run {run_id}: {} documents, persona {:?}",
            input.documents.len(),
            input.persona
        );

        // The profile does not depend on the documents, and its domain picks the
        // heading keywords used during segmentation.
        let profile = extract_profile(&input.persona, &input.job_to_be_done, &self.settings.extractor);
        if profile.is_empty() {
            info!("Collection run {run_id}: no keywords, ranking on structure and length only");
        } else {
            info!(
                "Collection run {run_id}: domain {} ({:.2}), {} keywords",
                profile.domain.label(),
                profile.domain_confidence,
                profile.weighted_keywords.len()
            );
        }

        let mut metadata = CollectionMetadata {
            run_id,
            input_documents: input.documents.iter().map(|d| d.filename.clone()).collect(),
            failed_documents: Vec::new(),
            persona: input.persona.clone(),
            job_to_be_done: input.job_to_be_done.clone(),
            domain: profile.domain,
            signals: profile.signals,
            processing_timestamp: Utc::now(),
        };

        if input.documents.is_empty() {
            info!("Collection run {run_id}: no documents, nothing to rank");
            return Ok(CollectionOutput {
                metadata,
                ranked_sections: Vec::new(),
                ranked_subsections: Vec::new(),
            });
        }

        let document_count = input.documents.len();
        let mut texts = Vec::with_capacity(document_count);
        for (document_index, document) in input.documents.into_iter().enumerate() {
            let filename = document.filename.clone();
            match self.extract(document).await {
                Ok(pages) => {
                    let text = DocumentText {
                        document_id: filename,
                        document_index,
                        pages,
                    };
                    if text.is_blank() {
                        warn!("Document {} has no extractable text, skipping", text.document_id);
                        metadata.failed_documents.push(DocumentFailure {
                            filename: text.document_id,
                            reason: NO_TEXT_REASON.to_string(),
                        });
                        continue;
                    }
                    texts.push(text);
                }
                Err(e) => {
                    warn!("Document {filename} failed extraction: {e}");
                    metadata.failed_documents.push(DocumentFailure {
                        filename,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if texts.is_empty() {
            return Err(CollectionError::NoDocumentText {
                documents: document_count,
            });
        }

        let settings = self.settings.clone();
        let (sections, subsections) =
            tokio::task::spawn_blocking(move || rank_documents(&texts, &profile, &settings))
                .await
                .map_err(|e| CollectionError::TaskFailed(e.to_string()))?;

        info!(
            "Collection run {run_id}: {} sections, {} subsections, {} failed documents",
            sections.len(),
            subsections.len(),
            metadata.failed_documents.len()
        );

        Ok(CollectionOutput {
            metadata,
            ranked_sections: sections
                .iter()
                .take(self.settings.max_sections)
                .map(section_record)
                .collect(),
            ranked_subsections: subsections
                .iter()
                .take(self.settings.max_subsections)
                .map(subsection_record)
                .collect(),
        })
    }

    /// Runs the extractor on the blocking pool under the parse budget. A panic inside the
    /// extractor counts as an unreadable document.
    async fn extract(&self, document: DocumentInput) -> Result<Vec<PageText>, ExtractionError> {
        let extractor = Arc::clone(&self.extractor);
        let budget = self.settings.parse_timeout;
        let handle = tokio::task::spawn_blocking(move || {
            extractor.extract(&document.filename, &document.content)
        });

        match tokio::time::timeout(budget, handle).await {
            Err(_) => Err(ExtractionError::Timeout {
                secs: budget.as_secs(),
            }),
            Ok(Err(join_error)) => Err(ExtractionError::Unreadable(format!(
                "extractor aborted: {join_error}"
            ))),
            Ok(Ok(result)) => result,
        }
    }
}

/// Synchronous core: segment every document, rank the combined pool, refine the top-K.
pub fn rank_documents(
    texts: &[DocumentText],
    profile: &RequirementProfile,
    settings: &PipelineSettings,
) -> (Vec<ScoredSection>, Vec<SubSection>) {
    let segmenter = Segmenter::for_domain(profile.domain);
    let pool: Vec<_> = texts.iter().flat_map(|t| segmenter.segment(t)).collect();

    let ranked = rank_sections(pool, profile, &settings.weights);
    let top_k = settings.top_k.min(ranked.len());
    let subsections = refine(&ranked[..top_k], profile, &settings.weights);
    (ranked, subsections)
}

fn section_record(scored: &ScoredSection) -> RankedSectionRecord {
    RankedSectionRecord {
        document_id: scored.section.document_id.clone(),
        title: scored.section.title.clone(),
        rank: scored.rank,
        page_range: scored.section.page_range,
        relevance_score: scored.relevance_score,
        breakdown: scored.breakdown,
        relevance_factors: scored.relevance_factors.clone(),
    }
}

fn subsection_record(unit: &SubSection) -> RankedSubsectionRecord {
    RankedSubsectionRecord {
        document_id: unit.document_id.clone(),
        parent_section_title: unit.parent_title.clone(),
        text_span: unit.text_span.clone(),
        refined_text: unit.refined_text.clone(),
        page_number: unit.page_number,
        rank: unit.rank,
        relevance_score: unit.relevance_score,
        breakdown: unit.breakdown,
    }
}
