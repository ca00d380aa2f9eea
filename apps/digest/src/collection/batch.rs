//! Batch runner: walks a directory of collections and writes one digest per collection.
//!
//! Layout per collection:
//! - `challenge1b_input.json`: persona, job and the document list
//! - `PDFs/`: the documents named in the input
//! - `challenge1b_output.json`: written by the [`CollectionSink`]
//!
//! Collections run concurrently on a `JoinSet`; a failing collection is logged and does
//! not stop its siblings.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::collection::runner::{CollectionError, CollectionRunner};
use crate::models::{CollectionInput, CollectionOutput, DocumentFailure, DocumentInput};
use crate::requirements::{Domain, ProfileSignals};

pub const INPUT_FILE: &str = "challenge1b_input.json";
pub const OUTPUT_FILE: &str = "challenge1b_output.json";
pub const DOCUMENTS_DIR: &str = "PDFs";

// ────────────────────────────────────────────────────────────────────────────
// File formats
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeInput {
    #[serde(default)]
    pub challenge_info: Option<serde_json::Value>,
    #[serde(default)]
    pub documents: Vec<ChallengeDocument>,
    #[serde(default)]
    pub persona: PersonaSpec,
    #[serde(default)]
    pub job_to_be_done: JobSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeDocument {
    pub filename: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaSpec {
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSpec {
    #[serde(default)]
    pub task: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeOutput {
    pub metadata: ChallengeMetadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeMetadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    pub domain: Domain,
    pub signals: ProfileSignals,
    pub failed_documents: Vec<DocumentFailure>,
    pub processing_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    pub importance_rank: usize,
    pub page_number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub refined_text: String,
    pub page_number: u32,
}

impl ChallengeOutput {
    pub fn from_collection(
        challenge: &ChallengeInput,
        output: &CollectionOutput,
        missing: Vec<DocumentFailure>,
    ) -> Self {
        let mut failed_documents = missing;
        failed_documents.extend(output.metadata.failed_documents.iter().cloned());

        Self {
            metadata: ChallengeMetadata {
                input_documents: challenge.documents.iter().map(|d| d.filename.clone()).collect(),
                persona: output.metadata.persona.clone(),
                job_to_be_done: output.metadata.job_to_be_done.clone(),
                domain: output.metadata.domain,
                signals: output.metadata.signals,
                failed_documents,
                processing_timestamp: output.metadata.processing_timestamp,
            },
            extracted_sections: output
                .ranked_sections
                .iter()
                .map(|s| ExtractedSection {
                    document: s.document_id.clone(),
                    section_title: s.title.clone(),
                    importance_rank: s.rank,
                    page_number: s.page_range.start,
                })
                .collect(),
            subsection_analysis: output
                .ranked_subsections
                .iter()
                .map(|u| SubsectionAnalysis {
                    document: u.document_id.clone(),
                    refined_text: u.refined_text.clone(),
                    page_number: u.page_number,
                })
                .collect(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output sink
// ────────────────────────────────────────────────────────────────────────────

/// Where finished digests go. Carried as `Arc<dyn CollectionSink>`.
#[async_trait]
pub trait CollectionSink: Send + Sync {
    async fn write(&self, collection_dir: &Path, output: &ChallengeOutput) -> Result<()>;
}

/// Writes pretty-printed JSON to `<collection>/challenge1b_output.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileSink;

#[async_trait]
impl CollectionSink for JsonFileSink {
    async fn write(&self, collection_dir: &Path, output: &ChallengeOutput) -> Result<()> {
        let path = collection_dir.join(OUTPUT_FILE);
        let json = serde_json::to_vec_pretty(output).context("Failed to serialize output")?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Output saved to {}", path.display());
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Runner
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Sub-directories of `base` that hold an input file and a documents directory, sorted
/// by path. Anything else is skipped with a warning.
pub async fn discover_collections(base: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(base)
        .await
        .with_context(|| format!("Cannot read collections directory {}", base.display()))?;

    let mut collections = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        if !path.join(INPUT_FILE).is_file() {
            warn!("{INPUT_FILE} not found in {}, skipping", path.display());
            continue;
        }
        if !path.join(DOCUMENTS_DIR).is_dir() {
            warn!("{DOCUMENTS_DIR} directory not found in {}, skipping", path.display());
            continue;
        }
        collections.push(path);
    }
    collections.sort();
    Ok(collections)
}

/// Processes every collection under `base` concurrently.
pub async fn run_batch(
    base: &Path,
    runner: &CollectionRunner,
    sink: Arc<dyn CollectionSink>,
) -> Result<BatchSummary> {
    let collections = discover_collections(base).await?;
    info!("Found {} collections in {}", collections.len(), base.display());

    let mut set = JoinSet::new();
    for dir in collections {
        let runner = runner.clone();
        let sink = Arc::clone(&sink);
        set.spawn(async move {
            let result = process_collection_dir(&dir, &runner, sink.as_ref()).await;
            (dir, result)
        });
    }

    let mut summary = BatchSummary::default();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((dir, Ok(()))) => {
                info!("Collection {} done", dir.display());
                summary.processed += 1;
            }
            Ok((dir, Err(e))) => {
                error!("Collection {} failed: {e:#}", dir.display());
                summary.failed += 1;
            }
            Err(e) => {
                error!("Collection task aborted: {e}");
                summary.failed += 1;
            }
        }
    }

    info!(
        "Batch finished: {} processed, {} failed",
        summary.processed, summary.failed
    );
    Ok(summary)
}

/// Reads, ranks and writes a single collection directory.
pub async fn process_collection_dir(
    dir: &Path,
    runner: &CollectionRunner,
    sink: &dyn CollectionSink,
) -> Result<()> {
    let challenge = read_challenge_input(dir).await?;
    let (input, missing) = load_documents(dir, &challenge).await;

    if input.documents.is_empty() && !missing.is_empty() {
        return Err(CollectionError::NoDocumentText {
            documents: missing.len(),
        }
        .into());
    }

    let output = runner.process(input).await?;
    let digest = ChallengeOutput::from_collection(&challenge, &output, missing);
    sink.write(dir, &digest).await
}

pub async fn read_challenge_input(dir: &Path) -> Result<ChallengeInput> {
    let path = dir.join(INPUT_FILE);
    let raw = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Reads each listed document. Unreadable files are returned as failures instead of
/// aborting the collection.
async fn load_documents(
    dir: &Path,
    challenge: &ChallengeInput,
) -> (CollectionInput, Vec<DocumentFailure>) {
    let documents_dir = dir.join(DOCUMENTS_DIR);
    let mut documents = Vec::with_capacity(challenge.documents.len());
    let mut missing = Vec::new();

    for doc in &challenge.documents {
        if !is_plain_file_name(&doc.filename) {
            warn!("Rejecting document name {:?}: not a plain file name", doc.filename);
            missing.push(DocumentFailure {
                filename: doc.filename.clone(),
                reason: format!("Document name must be a file inside {DOCUMENTS_DIR}/"),
            });
            continue;
        }
        let path = documents_dir.join(&doc.filename);
        match tokio::fs::read(&path).await {
            Ok(bytes) => documents.push(DocumentInput::new(doc.filename.clone(), bytes)),
            Err(e) => {
                warn!("Cannot read {}: {e}", path.display());
                missing.push(DocumentFailure {
                    filename: doc.filename.clone(),
                    reason: format!("Cannot read file: {e}"),
                });
            }
        }
    }

    let input = CollectionInput {
        persona: challenge.persona.role.clone(),
        job_to_be_done: challenge.job_to_be_done.task.clone(),
        documents,
    };
    (input, missing)
}

/// True when `name` is a single path component, so joining it cannot leave the
/// documents directory.
fn is_plain_file_name(name: &str) -> bool {
    Path::new(name).file_name() == Some(OsStr::new(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::json;

    use crate::collection::runner::PipelineSettings;
    use crate::segmentation::DocumentTextExtractor;

    const MENU: &str = "Meat Dishes\nBeef stew with carrots and roast lamb.\n\n\
                        Vegetarian Starters\nVegetarian falafel and hummus for the buffet menu.\n";

    fn runner() -> CollectionRunner {
        CollectionRunner::new(Arc::new(DocumentTextExtractor), PipelineSettings::default())
    }

    fn write_collection(base: &Path, name: &str, files: &[(&str, &str)], listed: &[&str]) -> PathBuf {
        let dir = base.join(name);
        std::fs::create_dir_all(dir.join(DOCUMENTS_DIR)).unwrap();
        for (filename, content) in files {
            std::fs::write(dir.join(DOCUMENTS_DIR).join(filename), content).unwrap();
        }
        let input = json!({
            "challenge_info": { "challenge_id": "round_1b_001", "test_case_name": name },
            "documents": listed.iter().map(|f| json!({ "filename": f, "title": f })).collect::<Vec<_>>(),
            "persona": { "role": "Food Contractor" },
            "job_to_be_done": { "task": "Prepare a vegetarian buffet-style dinner menu" }
        });
        std::fs::write(dir.join(INPUT_FILE), serde_json::to_vec(&input).unwrap()).unwrap();
        dir
    }

    #[derive(Default)]
    struct MemorySink {
        written: Mutex<Vec<(PathBuf, ChallengeOutput)>>,
    }

    #[async_trait]
    impl CollectionSink for MemorySink {
        async fn write(&self, collection_dir: &Path, output: &ChallengeOutput) -> Result<()> {
            self.written
                .lock()
                .unwrap()
                .push((collection_dir.to_path_buf(), output.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_batch_writes_output_file() {
        let base = tempfile::tempdir().unwrap();
        let dir = write_collection(base.path(), "Collection 1", &[("menu.pdf", MENU)], &["menu.pdf"]);

        let summary = run_batch(base.path(), &runner(), Arc::new(JsonFileSink)).await.unwrap();
        assert_eq!(summary, BatchSummary { processed: 1, failed: 0 });

        let raw = std::fs::read(dir.join(OUTPUT_FILE)).unwrap();
        let output: ChallengeOutput = serde_json::from_slice(&raw).unwrap();
        assert_eq!(output.metadata.persona, "Food Contractor");
        assert_eq!(output.metadata.input_documents, vec!["menu.pdf"]);
        assert_eq!(output.extracted_sections[0].section_title, "Vegetarian Starters");
        assert_eq!(output.extracted_sections[0].importance_rank, 1);
        assert_eq!(output.extracted_sections[0].page_number, 1);
        assert!(!output.subsection_analysis.is_empty());
    }

    #[tokio::test]
    async fn test_directories_without_input_are_skipped() {
        let base = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(base.path().join("stray").join(DOCUMENTS_DIR)).unwrap();
        write_collection(base.path(), "real", &[("menu.pdf", MENU)], &["menu.pdf"]);

        let found = discover_collections(base.path()).await.unwrap();
        assert_eq!(found, vec![base.path().join("real")]);
    }

    #[tokio::test]
    async fn test_failing_collection_does_not_abort_siblings() {
        let base = tempfile::tempdir().unwrap();
        write_collection(base.path(), "good", &[("menu.pdf", MENU)], &["menu.pdf"]);
        write_collection(base.path(), "empty", &[], &["missing.pdf"]);

        let sink = Arc::new(MemorySink::default());
        let summary = run_batch(base.path(), &runner(), sink.clone()).await.unwrap();
        assert_eq!(summary, BatchSummary { processed: 1, failed: 1 });

        let written = sink.written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].0.ends_with("good"));
    }

    #[tokio::test]
    async fn test_missing_file_is_reported_as_failed_document() {
        let base = tempfile::tempdir().unwrap();
        let dir = write_collection(
            base.path(),
            "partial",
            &[("menu.pdf", MENU)],
            &["menu.pdf", "gone.pdf"],
        );

        let sink = MemorySink::default();
        process_collection_dir(&dir, &runner(), &sink).await.unwrap();

        let written = sink.written.lock().unwrap();
        let output = &written[0].1;
        assert_eq!(output.metadata.input_documents, vec!["menu.pdf", "gone.pdf"]);
        assert_eq!(output.metadata.failed_documents.len(), 1);
        assert_eq!(output.metadata.failed_documents[0].filename, "gone.pdf");
    }

    #[tokio::test]
    async fn test_document_names_cannot_leave_pdfs_dir() {
        let base = tempfile::tempdir().unwrap();
        let dir = write_collection(
            base.path(),
            "escape",
            &[("menu.pdf", MENU)],
            &["menu.pdf", "../secret.txt"],
        );
        std::fs::write(dir.join("secret.txt"), "Secret Recipes\nVegetarian buffet menu.\n").unwrap();

        let sink = MemorySink::default();
        process_collection_dir(&dir, &runner(), &sink).await.unwrap();

        let written = sink.written.lock().unwrap();
        let output = &written[0].1;
        assert_eq!(output.metadata.failed_documents.len(), 1);
        assert_eq!(output.metadata.failed_documents[0].filename, "../secret.txt");
        assert!(output.extracted_sections.iter().all(|s| s.document == "menu.pdf"));
    }

    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("menu.pdf"));
        assert!(is_plain_file_name("South of France - Cuisine.pdf"));
        assert!(!is_plain_file_name("../menu.pdf"));
        assert!(!is_plain_file_name("sub/menu.pdf"));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("/etc/passwd"));
        assert!(!is_plain_file_name(""));
    }

    #[tokio::test]
    async fn test_invalid_input_json_is_an_error() {
        let base = tempfile::tempdir().unwrap();
        let dir = base.path().join("broken");
        std::fs::create_dir_all(dir.join(DOCUMENTS_DIR)).unwrap();
        std::fs::write(dir.join(INPUT_FILE), b"{ not json").unwrap();

        let err = process_collection_dir(&dir, &runner(), &JsonFileSink).await.unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }
}
