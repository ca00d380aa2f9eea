use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::warn;

use crate::errors::AppError;
use crate::models::{CollectionInput, CollectionOutput, DocumentInput};
use crate::state::AppState;

/// POST /api/v1/collections/rank
///
/// Multipart body: text fields `persona` and `job_to_be_done`, plus one file part per
/// document.
pub async fn handle_rank_collection(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CollectionOutput>, AppError> {
    let mut persona = None;
    let mut job_to_be_done = None;
    let mut documents = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match (name.as_str(), field.file_name().map(str::to_string)) {
            (_, Some(filename)) => {
                let content = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read document '{filename}': {e}"))
                })?;
                documents.push(DocumentInput::new(filename, content));
            }
            ("persona", None) => persona = Some(read_text(field, "persona").await?),
            ("job_to_be_done", None) => {
                job_to_be_done = Some(read_text(field, "job_to_be_done").await?)
            }
            (other, None) => warn!("Ignoring unknown multipart field '{other}'"),
        }
    }

    let input = CollectionInput {
        persona: persona.ok_or_else(|| AppError::Validation("Missing field 'persona'".into()))?,
        job_to_be_done: job_to_be_done
            .ok_or_else(|| AppError::Validation("Missing field 'job_to_be_done'".into()))?,
        documents,
    };

    let output = state.runner.process(input).await?;
    Ok(Json(output))
}

async fn read_text(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Field '{name}' is not valid text: {e}")))
}
