//! API request/response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ConceptMapRecord, GeneratedQuestion, Upload, UploadStatus};
use crate::services::StatusView;

// ============================================================================
// Health Check
// ============================================================================

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub components: HealthComponents,
}

/// Health status of individual components
#[derive(Serialize)]
pub struct HealthComponents {
    pub storage: bool,
    /// True when an AI backend credential is configured; false means
    /// deterministic fallback mode.
    pub ai_backend: bool,
}

// ============================================================================
// Uploads
// ============================================================================

/// Query parameters identifying the requesting user
#[derive(Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,

    /// Optional subject filter for listings.
    pub subject_id: Option<Uuid>,
}

/// Response after accepting an upload
#[derive(Serialize)]
pub struct UploadAccepted {
    pub success: bool,
    pub upload: Upload,
}

/// Response for upload listings
#[derive(Serialize)]
pub struct UploadList {
    pub uploads: Vec<Upload>,
    pub count: usize,
}

/// Processing status response
#[derive(Serialize)]
pub struct UploadStatusResponse {
    #[serde(flatten)]
    pub status: StatusView,
}

/// Request to (re)process an upload
#[derive(Deserialize)]
pub struct ProcessRequest {
    pub user_id: Uuid,

    /// Rerun the pipeline even for a completed upload, replacing its
    /// metadata.
    #[serde(default)]
    pub force_reprocess: bool,
}

/// Response to a process request
#[derive(Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    /// False when the upload was already completed and no force flag was
    /// set.
    pub started: bool,
    pub status: UploadStatus,
}

/// Response to a delete request
#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted: bool,
}

// ============================================================================
// Question generation
// ============================================================================

fn default_num_questions() -> usize {
    5
}

fn default_difficulty() -> String {
    "medium".to_string()
}

/// Request to generate quiz/exam questions
#[derive(Deserialize)]
pub struct GenerateQuestionsRequest {
    pub user_id: Uuid,

    /// Uploads whose extracted text is the source content.
    #[serde(default)]
    pub source_upload_ids: Vec<Uuid>,

    /// Inline content, used instead of uploads when provided.
    pub content: Option<String>,

    #[serde(default = "default_difficulty")]
    pub difficulty: String,

    #[serde(default = "default_num_questions")]
    pub num_questions: usize,
}

/// Generated questions with the recomputed exam total
#[derive(Serialize)]
pub struct GenerateQuestionsResponse {
    pub questions: Vec<GeneratedQuestion>,
    pub count: usize,
    /// Sum of per-question points; recomputed here, not stored.
    pub total_points: u32,
}

// ============================================================================
// Concept map generation
// ============================================================================

/// Request to generate and persist a concept map
#[derive(Deserialize)]
pub struct GenerateConceptMapRequest {
    pub user_id: Uuid,
    pub subject_id: Uuid,
    pub title: String,

    #[serde(default)]
    pub source_upload_ids: Vec<Uuid>,

    /// Inline content, used instead of uploads when provided.
    pub content: Option<String>,
}

/// Persisted concept map response
#[derive(Serialize)]
pub struct ConceptMapResponse {
    pub success: bool,
    pub concept_map: ConceptMapRecord,
}
