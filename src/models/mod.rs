//! Domain records: uploads, generated questions, concept maps.

pub mod concept_map;
pub mod question;
pub mod upload;

pub use concept_map::{
    ConceptEdge, ConceptGraph, ConceptMapRecord, ConceptNode, NodeKind, PersistedEdge,
    PersistedNode, RelationKind,
};
pub use question::{total_points, CorrectAnswer, Difficulty, GeneratedQuestion, QuestionKind};
pub use upload::{Dimensions, FileMetadata, Upload, UploadKind, UploadStatus};
