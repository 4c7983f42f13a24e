//! Background ingestion worker.
//!
//! Submission enqueues a job and returns; a dispatcher task spawns one
//! task per job. No ordering is guaranteed between documents. Jobs are
//! safe to redeliver: processing ends in a full metadata replacement, so
//! running the same document twice converges on the same record.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::services::error::{ServiceError, ServiceResult};

use super::IngestionService;

/// One ingestion job.
#[derive(Debug, Clone, Copy)]
pub struct IngestJob {
    pub upload_id: Uuid,
}

/// Handle for enqueueing ingestion jobs.
#[derive(Clone)]
pub struct IngestWorkerHandle {
    tx: mpsc::Sender<IngestJob>,
}

impl IngestWorkerHandle {
    /// Enqueues a job for background processing.
    pub async fn enqueue(&self, job: IngestJob) -> ServiceResult<()> {
        self.tx
            .send(job)
            .await
            .map_err(|_| ServiceError::Storage("ingestion worker is not running".to_string()))
    }
}

/// Spawns the ingestion dispatcher.
///
/// The dispatcher exits when every handle is dropped and the channel
/// drains. Failures inside a job are already recorded on the upload by
/// the service; only record-level errors end up in the log here.
pub fn spawn_ingest_worker(service: Arc<IngestionService>, capacity: usize) -> IngestWorkerHandle {
    let (tx, mut rx) = mpsc::channel::<IngestJob>(capacity);

    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            debug!("Dispatching ingestion job for upload {}", job.upload_id);
            let service = service.clone();
            tokio::spawn(async move {
                if let Err(e) = service.process(job.upload_id).await {
                    error!("Ingestion job for upload {} failed: {}", job.upload_id, e);
                }
            });
        }
        debug!("Ingestion worker shutting down - channel closed");
    });

    IngestWorkerHandle { tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{UploadKind, UploadStatus};
    use crate::services::analysis::ContentAnalyzer;
    use crate::services::config::AppConfig;
    use crate::services::storage::MemoryStorage;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_worker_processes_submitted_upload() {
        let service = Arc::new(IngestionService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStorage::new()),
            ContentAnalyzer::new(None),
            AppConfig::default(),
        ));
        let worker = spawn_ingest_worker(service.clone(), 8);

        let user = Uuid::new_v4();
        let upload = service
            .submit(
                user,
                Uuid::new_v4(),
                "notes.txt".to_string(),
                UploadKind::Text,
                b"Il gatto mangia sempre tanto cibo. Il cane corre veloce nel parco.".to_vec(),
            )
            .await
            .unwrap();

        worker
            .enqueue(IngestJob {
                upload_id: upload.id,
            })
            .await
            .unwrap();

        // Poll until the worker publishes the outcome
        let mut status = service.status(upload.id, user).await.unwrap();
        for _ in 0..50 {
            if status.status != UploadStatus::Processing {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            status = service.status(upload.id, user).await.unwrap();
        }

        assert_eq!(status.status, UploadStatus::Completed);
        assert!(status.metadata.is_some());
    }
}
