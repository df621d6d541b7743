//! Document submission and retrieval handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use distiller::{AnalysisSummary, Document, DocumentAnalysis, SearchHit};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
    pub title: Option<String>,
    pub document_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub document_id: String,
}

/// `POST /api/documents` — validate the submission synchronously, then queue
/// a distillation job. No job exists for a rejected document.
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::InvalidInput("document text is empty".into()));
    }
    if request.text.len() > state.config.max_document_bytes {
        return Err(ApiError::PayloadTooLarge(format!(
            "document exceeds the {} byte limit",
            state.config.max_document_bytes
        )));
    }
    if request.text.chars().count() < state.config.min_document_chars {
        return Err(ApiError::InvalidInput(format!(
            "document is shorter than the {} character minimum",
            state.config.min_document_chars
        )));
    }

    let title = request
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Untitled document".to_string());
    let document = match request.document_id {
        Some(id) => Document::with_id(id, title, request.text),
        None => Document::new(title, request.text),
    };

    let document_id = document.document_id.clone();
    let job_id = state.runner.spawn(document);
    tracing::info!(%job_id, %document_id, "document accepted");

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            job_id,
            document_id,
        }),
    ))
}

/// `GET /api/documents` — summaries of all persisted analyses, newest first.
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<AnalysisSummary>>, ApiError> {
    let summaries = state
        .store
        .list()
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    Ok(Json(summaries))
}

/// `GET /api/documents/{id}` — the full validated analysis, by document id
/// or by the job id returned at submission. A failed job never yields a
/// partial document, so this is 404 until a run succeeds.
pub async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentAnalysis>, ApiError> {
    if let Some(analysis) = state
        .store
        .load(&id)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
    {
        return Ok(Json(analysis));
    }

    // Job ids are uuids; document ids are caller-supplied or doc_-prefixed.
    if let Ok(job_id) = Uuid::parse_str(&id) {
        if let Some(job) = state.registry.get(job_id) {
            let analysis = state
                .store
                .load(&job.document_id)
                .await
                .map_err(|e| ApiError::Internal(e.into()))?;
            return match analysis {
                Some(analysis) => Ok(Json(analysis)),
                None => Err(ApiError::NotFound(format!(
                    "job {job_id} has not produced an analysis"
                ))),
            };
        }
    }

    Err(ApiError::NotFound(format!("no analysis for document {id}")))
}

/// `DELETE /api/documents/{id}` — cascade delete.
pub async fn remove(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .store
        .delete(&document_id)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!(
            "no analysis for document {document_id}"
        )))
    }
}

fn default_limit() -> usize {
    20
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub document_id: String,
    pub query: String,
    pub hits: Vec<SearchHit>,
}

/// `GET /api/documents/{id}/search?q=` — proposition-text search within one
/// document.
pub async fn search(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    if params.q.trim().is_empty() {
        return Err(ApiError::InvalidInput("search query is empty".into()));
    }
    let known = state
        .store
        .load(&document_id)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .is_some();
    if !known {
        return Err(ApiError::NotFound(format!(
            "no analysis for document {document_id}"
        )));
    }

    let hits = state
        .store
        .search(&document_id, &params.q, params.limit)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    Ok(Json(SearchResponse {
        document_id,
        query: params.q,
        hits,
    }))
}
