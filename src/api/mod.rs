//! HTTP REST API built with Axum.
//!
//! - `/health` - Health check endpoint
//! - `/v1/uploads` - Upload submission, listing, status and reprocessing
//! - `/v1/quizzes/generate` - Question generation from uploads
//! - `/v1/concept-maps/generate` - Concept map generation

pub mod error;
pub mod handlers;
pub mod routes;
pub mod types;

// Re-exports
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use handlers::{AppState, SharedState};
pub use routes::{create_router, print_routes};
pub use types::*;
