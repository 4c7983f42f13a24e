//! studybox: study-platform backend core.
//!
//! Upload ingestion (extraction, analysis, lifecycle) and AI-assisted
//! content generation (quiz/exam questions, concept maps) behind a REST
//! API. The AI backend is optional; every generation path has a
//! deterministic local fallback.

pub mod api;
pub mod llm;
pub mod models;
pub mod services;
pub mod store;

// Re-export main types
pub use models::{
    ConceptGraph, ConceptMapRecord, Difficulty, FileMetadata, GeneratedQuestion, Upload,
    UploadKind, UploadStatus,
};
pub use services::{
    AppConfig, ConceptMapService, ContentAnalyzer, ContentGenerator, IngestionService,
    ServiceError,
};
pub use store::{DocumentStore, MemoryStore};
