//! In-memory datastore.
//!
//! Backs the server in single-process deployments and every test. Each
//! record mutation takes the write lock once and replaces whole values,
//! so a reader never observes a half-updated record.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{ConceptMapRecord, PersistedEdge, PersistedNode, Upload, UploadStatus};
use crate::services::error::{ServiceError, ServiceResult};

use super::{DocumentStore, ProcessingOutcome};

/// In-memory [`DocumentStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    uploads: RwLock<HashMap<Uuid, Upload>>,
    concept_maps: RwLock<HashMap<Uuid, ConceptMapRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_upload(&self, upload: Upload) -> ServiceResult<Uuid> {
        let id = upload.id;
        self.uploads.write().await.insert(id, upload);
        Ok(id)
    }

    async fn get_upload(&self, id: Uuid, user_id: Uuid) -> ServiceResult<Option<Upload>> {
        Ok(self
            .uploads
            .read()
            .await
            .get(&id)
            .filter(|u| u.user_id == user_id)
            .cloned())
    }

    async fn get_upload_unscoped(&self, id: Uuid) -> ServiceResult<Option<Upload>> {
        Ok(self.uploads.read().await.get(&id).cloned())
    }

    async fn list_uploads(
        &self,
        user_id: Uuid,
        subject_id: Option<Uuid>,
    ) -> ServiceResult<Vec<Upload>> {
        let uploads = self.uploads.read().await;
        let mut result: Vec<Upload> = uploads
            .values()
            .filter(|u| u.user_id == user_id)
            .filter(|u| subject_id.map_or(true, |s| u.subject_id == s))
            .cloned()
            .collect();
        result.sort_by_key(|u| u.created_at);
        Ok(result)
    }

    async fn set_upload_status(&self, id: Uuid, status: UploadStatus) -> ServiceResult<()> {
        let mut uploads = self.uploads.write().await;
        let upload = uploads
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("upload {id}")))?;

        if status == UploadStatus::Processing {
            upload.reset_for_processing();
        } else {
            upload.status = status;
        }
        Ok(())
    }

    async fn finish_processing(&self, id: Uuid, outcome: ProcessingOutcome) -> ServiceResult<()> {
        let mut uploads = self.uploads.write().await;
        let upload = uploads
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("upload {id}")))?;

        match outcome {
            ProcessingOutcome::Completed(metadata) => upload.complete(metadata),
            ProcessingOutcome::Failed(error) => upload.fail(error),
        }
        Ok(())
    }

    async fn delete_upload(&self, id: Uuid, user_id: Uuid) -> ServiceResult<bool> {
        let mut uploads = self.uploads.write().await;
        match uploads.get(&id) {
            Some(upload) if upload.user_id == user_id => {
                uploads.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_concept_map(&self, record: ConceptMapRecord) -> ServiceResult<Uuid> {
        let id = record.id;
        self.concept_maps.write().await.insert(id, record);
        Ok(id)
    }

    async fn insert_concept_nodes(
        &self,
        map_id: Uuid,
        nodes: Vec<PersistedNode>,
    ) -> ServiceResult<()> {
        let mut maps = self.concept_maps.write().await;
        let map = maps
            .get_mut(&map_id)
            .ok_or_else(|| ServiceError::NotFound(format!("concept map {map_id}")))?;
        map.nodes.extend(nodes);
        Ok(())
    }

    async fn insert_concept_edges(
        &self,
        map_id: Uuid,
        edges: Vec<PersistedEdge>,
    ) -> ServiceResult<()> {
        let mut maps = self.concept_maps.write().await;
        let map = maps
            .get_mut(&map_id)
            .ok_or_else(|| ServiceError::NotFound(format!("concept map {map_id}")))?;

        // Referential integrity guard: the service resolves edges before
        // persisting, so a miss here is a bug upstream.
        let node_ids: std::collections::HashSet<Uuid> = map.nodes.iter().map(|n| n.id).collect();
        for edge in &edges {
            if !node_ids.contains(&edge.from_node_id) || !node_ids.contains(&edge.to_node_id) {
                return Err(ServiceError::Validation(format!(
                    "edge {} references a node not in concept map {map_id}",
                    edge.id
                )));
            }
        }

        map.edges.extend(edges);
        Ok(())
    }

    async fn get_concept_map(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<Option<ConceptMapRecord>> {
        Ok(self
            .concept_maps
            .read()
            .await
            .get(&id)
            .filter(|m| m.user_id == user_id)
            .cloned())
    }
}
