//! Service-level error types.

use thiserror::Error;

/// Errors raised by extraction, analysis and generation services.
///
/// `Extraction` propagates to the ingestion orchestrator, which converts
/// it into a `failed` status record instead of re-raising. `Validation`
/// propagates to the immediate caller as an actionable rejection.
/// AI-backend failures never appear here; they are absorbed into the
/// deterministic fallback paths (see [`crate::llm::LlmError`]).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ServiceError::Extraction("bad pdf".to_string());
        assert!(err.to_string().contains("bad pdf"));

        let err = ServiceError::Validation("empty content".to_string());
        assert!(err.to_string().contains("empty content"));
    }
}
