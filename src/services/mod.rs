//! Business services for studybox.
//!
//! This module provides:
//! - **Extraction**: per-kind content extractors (text, PDF, image OCR)
//! - **Analysis**: summary/keyword/language derivation with AI and
//!   deterministic fallback modes
//! - **Generation**: quiz/exam questions and concept graphs
//! - **Ingestion**: the per-upload processing lifecycle and its worker
//! - **Storage**: object storage for raw upload bytes
//! - **Configuration**: env-driven application settings

pub mod analysis;
pub mod concept_maps;
pub mod config;
pub mod error;
pub mod extraction;
pub mod generation;
pub mod ingestion;
pub mod sources;
pub mod storage;

// Re-exports
pub use analysis::{ContentAnalyzer, ContentMetadata};
pub use concept_maps::ConceptMapService;
pub use config::AppConfig;
pub use error::{ServiceError, ServiceResult};
pub use extraction::{ContentExtractor, ExtractionOutput, ExtractorFactory};
pub use generation::ContentGenerator;
pub use ingestion::{
    spawn_ingest_worker, IngestJob, IngestWorkerHandle, IngestionService, StatusView,
};
pub use sources::collect_extracted_text;
pub use storage::{DiskStorage, MemoryStorage, ObjectStorage};
