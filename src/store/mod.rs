//! Datastore abstraction.
//!
//! The [`DocumentStore`] trait defines the persistence operations the
//! ingestion and generation paths need, enabling pluggable backends. All
//! reads exposed to callers are scoped by `(id, user_id)` for tenant
//! isolation. `finish_processing` replaces the whole metadata record in
//! one write: concurrent reprocess attempts can race on which attempt
//! wins, but never interleave fields from two attempts.

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    ConceptMapRecord, FileMetadata, PersistedEdge, PersistedNode, Upload, UploadStatus,
};
use crate::services::error::ServiceResult;

pub use memory::MemoryStore;

/// Terminal outcome of one processing attempt, written atomically.
#[derive(Debug, Clone)]
pub enum ProcessingOutcome {
    Completed(FileMetadata),
    Failed(String),
}

/// Abstract datastore for uploads and concept maps.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new upload record, returning its id.
    async fn insert_upload(&self, upload: Upload) -> ServiceResult<Uuid>;

    /// Fetches an upload scoped to its owning user.
    async fn get_upload(&self, id: Uuid, user_id: Uuid) -> ServiceResult<Option<Upload>>;

    /// Fetches an upload by id alone. Reserved for the processing
    /// pipeline, which acts on records it was handed by the owner.
    async fn get_upload_unscoped(&self, id: Uuid) -> ServiceResult<Option<Upload>>;

    /// Lists a user's uploads, optionally filtered by subject.
    async fn list_uploads(
        &self,
        user_id: Uuid,
        subject_id: Option<Uuid>,
    ) -> ServiceResult<Vec<Upload>>;

    /// Sets the processing status flag (used to re-enter `processing`).
    async fn set_upload_status(&self, id: Uuid, status: UploadStatus) -> ServiceResult<()>;

    /// Records the outcome of a processing attempt in a single write:
    /// status, error and the full metadata record together.
    async fn finish_processing(&self, id: Uuid, outcome: ProcessingOutcome) -> ServiceResult<()>;

    /// Deletes an upload. Returns false when it does not exist for the
    /// user.
    async fn delete_upload(&self, id: Uuid, user_id: Uuid) -> ServiceResult<bool>;

    /// Creates an empty concept map shell.
    async fn insert_concept_map(&self, record: ConceptMapRecord) -> ServiceResult<Uuid>;

    /// Adds nodes to a concept map in one batch.
    async fn insert_concept_nodes(
        &self,
        map_id: Uuid,
        nodes: Vec<PersistedNode>,
    ) -> ServiceResult<()>;

    /// Adds edges to a concept map in one batch. Endpoints must already
    /// be persisted nodes of the same map.
    async fn insert_concept_edges(
        &self,
        map_id: Uuid,
        edges: Vec<PersistedEdge>,
    ) -> ServiceResult<()>;

    /// Fetches a concept map scoped to its owning user.
    async fn get_concept_map(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<Option<ConceptMapRecord>>;
}
