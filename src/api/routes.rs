//! API route definitions.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use super::handlers::{self, SharedState};

/// Creates the API router with all routes configured
pub fn create_router(state: SharedState) -> Router {
    let body_limit = state.config.max_file_size as usize;

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // API v1 routes
        .nest("/v1", api_v1_routes(body_limit))
        // State
        .with_state(state)
}

/// API v1 routes
fn api_v1_routes(body_limit: usize) -> Router<SharedState> {
    Router::new()
        .nest("/uploads", upload_routes(body_limit))
        // Question generation (synchronous; caller persists)
        .route("/quizzes/generate", post(handlers::generate_questions))
        // Concept map generation (persisted in-service)
        .route("/concept-maps/generate", post(handlers::generate_concept_map))
}

/// Upload lifecycle routes
fn upload_routes(body_limit: usize) -> Router<SharedState> {
    Router::new()
        // Submit a file (multipart) or list uploads
        .route(
            "/",
            post(handlers::create_upload).get(handlers::list_uploads),
        )
        // Record and status polling
        .route(
            "/{upload_id}",
            get(handlers::get_upload).delete(handlers::delete_upload),
        )
        .route("/{upload_id}/status", get(handlers::get_upload_status))
        // Manual (re)processing
        .route("/{upload_id}/process", post(handlers::process_upload))
        // Raised body limit for file submission
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Prints all available routes for logging
pub fn print_routes() {
    tracing::info!("Available API routes:");
    tracing::info!("  GET    /health                    - Health check");
    tracing::info!("  POST   /v1/uploads                - Submit upload (multipart)");
    tracing::info!("  GET    /v1/uploads                - List uploads");
    tracing::info!("  GET    /v1/uploads/:id            - Get upload");
    tracing::info!("  DELETE /v1/uploads/:id            - Delete upload");
    tracing::info!("  GET    /v1/uploads/:id/status     - Poll processing status");
    tracing::info!("  POST   /v1/uploads/:id/process    - Start (re)processing");
    tracing::info!("  POST   /v1/quizzes/generate       - Generate questions");
    tracing::info!("  POST   /v1/concept-maps/generate  - Generate concept map");
}
