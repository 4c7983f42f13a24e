//! API request handlers.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::models::{total_points, UploadKind};
use crate::services::{
    collect_extracted_text, AppConfig, ConceptMapService, ContentGenerator, IngestJob,
    IngestWorkerHandle, IngestionService,
};
use crate::store::DocumentStore;

use super::error::{ApiError, ApiResult};
use super::types::*;

/// Application state shared across handlers
pub struct AppState {
    pub ingestion: Arc<IngestionService>,
    pub generator: ContentGenerator,
    pub concept_maps: ConceptMapService,
    pub store: Arc<dyn DocumentStore>,
    pub worker: IngestWorkerHandle,
    pub config: AppConfig,
}

/// Thread-safe shared state
pub type SharedState = Arc<AppState>;

// ============================================================================
// Health Check Handler
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "studybox".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        components: HealthComponents {
            storage: true,
            ai_backend: state.config.ai_enabled(),
        },
    })
}

// ============================================================================
// Upload Handlers
// ============================================================================

/// Accepts a multipart upload and enqueues it for processing.
///
/// Fields: `file` (required), `user_id`, `subject_id`, optional `name`
/// and `kind` (detected from the filename extension when omitted).
pub async fn create_upload(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadAccepted>> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut name: Option<String> = None;
    let mut kind: Option<UploadKind> = None;
    let mut user_id: Option<Uuid> = None;
    let mut subject_id: Option<Uuid> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                filename = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await?.to_vec();
                file_bytes = Some(data);
            }
            Some("name") => {
                let txt = field.text().await?;
                if !txt.trim().is_empty() {
                    name = Some(txt);
                }
            }
            Some("kind") => {
                let txt = field.text().await?;
                kind = Some(UploadKind::from_str_opt(txt.trim()).ok_or_else(|| {
                    ApiError::ValidationError(format!("unsupported upload kind {txt:?}"))
                })?);
            }
            Some("user_id") => {
                let txt = field.text().await?;
                user_id = Some(parse_uuid("user_id", &txt)?);
            }
            Some("subject_id") => {
                let txt = field.text().await?;
                subject_id = Some(parse_uuid("subject_id", &txt)?);
            }
            _ => {}
        }
    }

    let file_bytes =
        file_bytes.ok_or_else(|| ApiError::ValidationError("missing file field".to_string()))?;
    let user_id =
        user_id.ok_or_else(|| ApiError::ValidationError("missing user_id field".to_string()))?;
    let subject_id = subject_id
        .ok_or_else(|| ApiError::ValidationError("missing subject_id field".to_string()))?;

    // Kind falls back to the filename extension
    let kind = match kind {
        Some(kind) => kind,
        None => filename
            .as_deref()
            .and_then(|f| f.rsplit('.').next())
            .and_then(UploadKind::from_extension)
            .ok_or_else(|| {
                ApiError::ValidationError(
                    "upload kind missing and not detectable from filename".to_string(),
                )
            })?,
    };

    let name = name
        .or(filename)
        .unwrap_or_else(|| "untitled".to_string());

    let upload = state
        .ingestion
        .submit(user_id, subject_id, name, kind, file_bytes)
        .await?;

    state
        .worker
        .enqueue(IngestJob {
            upload_id: upload.id,
        })
        .await?;

    Ok(Json(UploadAccepted {
        success: true,
        upload,
    }))
}

/// Lists a user's uploads
pub async fn list_uploads(
    State(state): State<SharedState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<UploadList>> {
    let uploads = state
        .store
        .list_uploads(query.user_id, query.subject_id)
        .await?;
    let count = uploads.len();
    Ok(Json(UploadList { uploads, count }))
}

/// Fetches one upload
pub async fn get_upload(
    State(state): State<SharedState>,
    Path(upload_id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<crate::models::Upload>> {
    let upload = state
        .store
        .get_upload(upload_id, query.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("upload {upload_id}")))?;
    Ok(Json(upload))
}

/// Polls processing status
pub async fn get_upload_status(
    State(state): State<SharedState>,
    Path(upload_id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<UploadStatusResponse>> {
    let status = state.ingestion.status(upload_id, query.user_id).await?;
    Ok(Json(UploadStatusResponse { status }))
}

/// Starts a (re)processing attempt
pub async fn process_upload(
    State(state): State<SharedState>,
    Path(upload_id): Path<Uuid>,
    Json(request): Json<ProcessRequest>,
) -> ApiResult<Json<ProcessResponse>> {
    let started = state
        .ingestion
        .prepare_reprocess(upload_id, request.user_id, request.force_reprocess)
        .await?;

    if started {
        state.worker.enqueue(IngestJob { upload_id }).await?;
    }

    let status = state.ingestion.status(upload_id, request.user_id).await?;

    Ok(Json(ProcessResponse {
        success: true,
        started,
        status: status.status,
    }))
}

/// Deletes an upload and its stored bytes
pub async fn delete_upload(
    State(state): State<SharedState>,
    Path(upload_id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = state.ingestion.delete(upload_id, query.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("upload {upload_id}")));
    }
    Ok(Json(DeleteResponse {
        success: true,
        deleted,
    }))
}

// ============================================================================
// Generation Handlers
// ============================================================================

/// Generates quiz/exam questions from uploads or inline content.
///
/// Synchronous: the caller receives the questions and owns persisting
/// them. `total_points` is recomputed from the returned set.
pub async fn generate_questions(
    State(state): State<SharedState>,
    Json(request): Json<GenerateQuestionsRequest>,
) -> ApiResult<Json<GenerateQuestionsResponse>> {
    let difficulty = crate::models::Difficulty::from_str_opt(&request.difficulty)
        .ok_or_else(|| {
            ApiError::ValidationError(format!("unknown difficulty {:?}", request.difficulty))
        })?;

    let content = match request.content {
        Some(content) if !content.trim().is_empty() => content,
        _ => {
            collect_extracted_text(&state.store, request.user_id, &request.source_upload_ids)
                .await?
        }
    };

    let questions = state
        .generator
        .generate_questions(&content, difficulty, request.num_questions)
        .await?;

    info!(
        "Generated {} questions ({}) for user {}",
        questions.len(),
        difficulty.as_str(),
        request.user_id
    );

    let total = total_points(&questions);
    let count = questions.len();

    Ok(Json(GenerateQuestionsResponse {
        questions,
        count,
        total_points: total,
    }))
}

/// Generates a concept map and persists it with the two-phase node/edge
/// commit.
pub async fn generate_concept_map(
    State(state): State<SharedState>,
    Json(request): Json<GenerateConceptMapRequest>,
) -> ApiResult<Json<ConceptMapResponse>> {
    let content = match request.content {
        Some(content) if !content.trim().is_empty() => content,
        _ => {
            collect_extracted_text(&state.store, request.user_id, &request.source_upload_ids)
                .await?
        }
    };

    let record = state
        .concept_maps
        .generate_and_persist(request.user_id, request.subject_id, request.title, &content)
        .await?;

    info!(
        "Generated concept map {} ({} nodes) for user {}",
        record.id,
        record.nodes.len(),
        request.user_id
    );

    Ok(Json(ConceptMapResponse {
        success: true,
        concept_map: record,
    }))
}

fn parse_uuid(field: &str, value: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| ApiError::ValidationError(format!("invalid {field}: {value:?}")))
}
