//! Upload ingestion orchestrator.
//!
//! Owns the per-upload lifecycle: `processing` → `completed` or
//! `processing` → `failed`, exactly one transition per attempt. The
//! pipeline is extraction, then analysis, then a single datastore write
//! that publishes the outcome; the status flip is the last action and is
//! what readers observe. Extractor and storage failures are converted
//! into a `failed` record with the error message stored verbatim, never
//! re-raised to the submitter.

pub mod worker;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{FileMetadata, Upload, UploadKind, UploadStatus};
use crate::store::{DocumentStore, ProcessingOutcome};

use super::analysis::ContentAnalyzer;
use super::config::AppConfig;
use super::error::{ServiceError, ServiceResult};
use super::extraction::ExtractorFactory;
use super::storage::ObjectStorage;

pub use worker::{spawn_ingest_worker, IngestJob, IngestWorkerHandle};

/// Processing view returned to pollers.
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub id: Uuid,
    pub status: UploadStatus,
    pub error: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub metadata: Option<FileMetadata>,
}

/// Orchestrates upload ingestion.
pub struct IngestionService {
    store: Arc<dyn DocumentStore>,
    storage: Arc<dyn ObjectStorage>,
    analyzer: ContentAnalyzer,
    config: AppConfig,
}

impl IngestionService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStorage>,
        analyzer: ContentAnalyzer,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            storage,
            analyzer,
            config,
        }
    }

    /// Accepts a new upload: validates it, stores the bytes and persists
    /// a `processing` record. Returns immediately; the actual pipeline
    /// runs when a worker picks up the job.
    pub async fn submit(
        &self,
        user_id: Uuid,
        subject_id: Uuid,
        name: String,
        kind: UploadKind,
        data: Vec<u8>,
    ) -> ServiceResult<Upload> {
        if !self.config.is_size_allowed(data.len() as u64) {
            return Err(ServiceError::Validation(format!(
                "file size {} exceeds maximum {}",
                data.len(),
                self.config.max_file_size
            )));
        }
        if data.is_empty() && kind != UploadKind::Link {
            return Err(ServiceError::Validation("uploaded file is empty".to_string()));
        }

        let key = format!("{}/{}", user_id, Uuid::new_v4());
        let storage_ref = self.storage.put(&data, &key).await?;

        let upload = Upload::new(
            user_id,
            subject_id,
            name,
            kind,
            data.len() as u64,
            storage_ref,
        );
        self.store.insert_upload(upload.clone()).await?;

        info!(
            "Accepted upload {} ({}, {} bytes) for user {}",
            upload.id,
            kind.as_str(),
            upload.size,
            user_id
        );

        Ok(upload)
    }

    /// Runs the full pipeline for one upload and publishes the outcome.
    ///
    /// Pipeline failures are recorded on the document, not returned: the
    /// error is only propagated when the record itself cannot be found
    /// or written.
    pub async fn process(&self, upload_id: Uuid) -> ServiceResult<()> {
        let upload = self
            .store
            .get_upload_unscoped(upload_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("upload {upload_id}")))?;

        debug!("Processing upload {} ({})", upload.id, upload.kind.as_str());

        let outcome = match self.run_pipeline(&upload).await {
            Ok(metadata) => ProcessingOutcome::Completed(metadata),
            Err(e) => {
                warn!("Upload {} failed processing: {}", upload.id, e);
                ProcessingOutcome::Failed(e.to_string())
            }
        };

        self.store.finish_processing(upload_id, outcome).await?;
        info!("Upload {} processing finished", upload_id);
        Ok(())
    }

    /// Extraction then analysis; returns the complete metadata record
    /// for this attempt.
    async fn run_pipeline(&self, upload: &Upload) -> ServiceResult<FileMetadata> {
        // Links carry no bytes to extract
        if upload.kind == UploadKind::Link {
            return Ok(FileMetadata::default());
        }

        let data = self.storage.get(&upload.storage_ref).await?;

        let extractor = ExtractorFactory::create(upload.kind, &self.config.ocr_languages)
            .ok_or_else(|| {
                ServiceError::Extraction(format!(
                    "no extractor available for kind {:?}",
                    upload.kind.as_str()
                ))
            })?;

        debug!("Using {} for upload {}", extractor.name(), upload.id);
        let output = extractor.extract(&data).await?;

        let mut metadata = FileMetadata {
            extracted_text: Some(output.text.clone()),
            pages: output.pages,
            duration_seconds: output.duration_seconds,
            dimensions: output.dimensions,
            ..Default::default()
        };

        // Analysis only runs over non-empty text; its AI failures are
        // absorbed inside the analyzer.
        if !output.text.trim().is_empty() {
            let analysis = self.analyzer.analyze(&output.text).await;
            metadata.summary = Some(analysis.summary);
            metadata.keywords = analysis.keywords;
            metadata.language = Some(analysis.language);
        }

        Ok(metadata)
    }

    /// Prepares a reprocessing attempt.
    ///
    /// Returns true when a new attempt was started (and should be
    /// enqueued); a `completed` document without `force` is left alone.
    pub async fn prepare_reprocess(
        &self,
        upload_id: Uuid,
        user_id: Uuid,
        force: bool,
    ) -> ServiceResult<bool> {
        let upload = self
            .store
            .get_upload(upload_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("upload {upload_id}")))?;

        if upload.status == UploadStatus::Completed && !force {
            return Ok(false);
        }

        self.store
            .set_upload_status(upload_id, UploadStatus::Processing)
            .await?;
        Ok(true)
    }

    /// Current processing status for polling.
    pub async fn status(&self, upload_id: Uuid, user_id: Uuid) -> ServiceResult<StatusView> {
        let upload = self
            .store
            .get_upload(upload_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("upload {upload_id}")))?;

        Ok(StatusView {
            id: upload.id,
            status: upload.status,
            error: upload.processing_error,
            processed_at: upload.processed_at,
            metadata: upload.metadata,
        })
    }

    /// Deletes the upload record and its stored bytes.
    pub async fn delete(&self, upload_id: Uuid, user_id: Uuid) -> ServiceResult<bool> {
        let Some(upload) = self.store.get_upload(upload_id, user_id).await? else {
            return Ok(false);
        };

        if let Err(e) = self.storage.delete(&upload.storage_ref).await {
            warn!("Failed to delete stored object {}: {}", upload.storage_ref, e);
        }

        self.store.delete_upload(upload_id, user_id).await
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStorage;
    use crate::store::MemoryStore;

    fn service() -> IngestionService {
        IngestionService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStorage::new()),
            ContentAnalyzer::new(None),
            AppConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_submit_creates_processing_record() {
        let service = service();
        let user = Uuid::new_v4();

        let upload = service
            .submit(
                user,
                Uuid::new_v4(),
                "notes.txt".to_string(),
                UploadKind::Text,
                b"Il gatto mangia sempre. Il cane corre veloce.".to_vec(),
            )
            .await
            .unwrap();

        assert_eq!(upload.status, UploadStatus::Processing);

        let status = service.status(upload.id, user).await.unwrap();
        assert_eq!(status.status, UploadStatus::Processing);
        assert!(status.metadata.is_none());
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_file() {
        let service = service();
        let result = service
            .submit(
                Uuid::new_v4(),
                Uuid::new_v4(),
                "empty.txt".to_string(),
                UploadKind::Text,
                vec![],
            )
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_submit_rejects_oversized_file() {
        let config = AppConfig {
            max_file_size: 8,
            ..Default::default()
        };
        let service = IngestionService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStorage::new()),
            ContentAnalyzer::new(None),
            config,
        );

        let result = service
            .submit(
                Uuid::new_v4(),
                Uuid::new_v4(),
                "big.txt".to_string(),
                UploadKind::Text,
                b"more than eight bytes".to_vec(),
            )
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_process_text_completes_with_analysis() {
        let service = service();
        let user = Uuid::new_v4();

        let upload = service
            .submit(
                user,
                Uuid::new_v4(),
                "notes.txt".to_string(),
                UploadKind::Text,
                b"Il gatto mangia sempre tanto. Il cane corre veloce. Gli uccelli volano alto."
                    .to_vec(),
            )
            .await
            .unwrap();

        service.process(upload.id).await.unwrap();

        let status = service.status(upload.id, user).await.unwrap();
        assert_eq!(status.status, UploadStatus::Completed);
        assert!(status.error.is_none());

        let metadata = status.metadata.unwrap();
        assert!(metadata.extracted_text.as_deref().unwrap().contains("gatto"));
        assert!(metadata.summary.is_some());
        assert!(!metadata.keywords.is_empty());
        assert_eq!(metadata.language.as_deref(), Some("it"));
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn test_process_corrupt_pdf_marks_failed() {
        let service = service();
        let user = Uuid::new_v4();

        let upload = service
            .submit(
                user,
                Uuid::new_v4(),
                "broken.pdf".to_string(),
                UploadKind::Pdf,
                b"%PDF-1.4 not actually a pdf".to_vec(),
            )
            .await
            .unwrap();

        // Pipeline failure is absorbed into the record
        service.process(upload.id).await.unwrap();

        let status = service.status(upload.id, user).await.unwrap();
        assert_eq!(status.status, UploadStatus::Failed);
        assert!(!status.error.unwrap().is_empty());
        assert!(status.metadata.is_none());
    }

    #[tokio::test]
    async fn test_process_video_stub_completes_empty() {
        let service = service();
        let user = Uuid::new_v4();

        let upload = service
            .submit(
                user,
                Uuid::new_v4(),
                "lecture.mp4".to_string(),
                UploadKind::Video,
                b"fake video".to_vec(),
            )
            .await
            .unwrap();
        service.process(upload.id).await.unwrap();

        let status = service.status(upload.id, user).await.unwrap();
        assert_eq!(status.status, UploadStatus::Completed);

        let metadata = status.metadata.unwrap();
        assert_eq!(metadata.extracted_text.as_deref(), Some(""));
        assert_eq!(metadata.duration_seconds, Some(0));
        // No analysis over empty text
        assert!(metadata.summary.is_none());
        assert!(metadata.keywords.is_empty());
    }

    #[tokio::test]
    async fn test_reprocess_replaces_metadata_fully() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let storage = Arc::new(MemoryStorage::new());
        let service = IngestionService::new(
            store.clone(),
            storage.clone(),
            ContentAnalyzer::new(None),
            AppConfig::default(),
        );
        let user = Uuid::new_v4();

        let upload = service
            .submit(
                user,
                Uuid::new_v4(),
                "notes.txt".to_string(),
                UploadKind::Text,
                b"La fotosintesi trasforma la luce solare in energia chimica per la pianta."
                    .to_vec(),
            )
            .await
            .unwrap();
        service.process(upload.id).await.unwrap();

        let first = service.status(upload.id, user).await.unwrap().metadata.unwrap();
        assert!(first.extracted_text.as_deref().unwrap().contains("fotosintesi"));

        // Different bytes behind the same reference, then force reprocess
        let key = upload.storage_ref.strip_prefix("mem://").unwrap();
        storage
            .put(
                b"Gli uccelli migratori attraversano il mare ogni anno in autunno.",
                key,
            )
            .await
            .unwrap();

        assert!(service.prepare_reprocess(upload.id, user, true).await.unwrap());
        service.process(upload.id).await.unwrap();

        let second = service.status(upload.id, user).await.unwrap().metadata.unwrap();
        assert!(second.extracted_text.as_deref().unwrap().contains("uccelli"));
        assert!(!second.extracted_text.as_deref().unwrap().contains("fotosintesi"));
        // No field survives from the first attempt
        assert_ne!(first.keywords, second.keywords);
    }

    #[tokio::test]
    async fn test_reprocess_completed_without_force_is_noop() {
        let service = service();
        let user = Uuid::new_v4();

        let upload = service
            .submit(
                user,
                Uuid::new_v4(),
                "notes.txt".to_string(),
                UploadKind::Text,
                b"La fotosintesi trasforma la luce in energia.".to_vec(),
            )
            .await
            .unwrap();
        service.process(upload.id).await.unwrap();

        assert!(!service.prepare_reprocess(upload.id, user, false).await.unwrap());

        let status = service.status(upload.id, user).await.unwrap();
        assert_eq!(status.status, UploadStatus::Completed);
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_object() {
        let service = service();
        let user = Uuid::new_v4();

        let upload = service
            .submit(
                user,
                Uuid::new_v4(),
                "notes.txt".to_string(),
                UploadKind::Text,
                b"some text".to_vec(),
            )
            .await
            .unwrap();

        assert!(service.delete(upload.id, user).await.unwrap());
        assert!(service.status(upload.id, user).await.is_err());
        assert!(!service.delete(upload.id, user).await.unwrap());
    }
}
