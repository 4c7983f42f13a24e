//! Video content extractor stub.
//!
//! Audio transcription is out of scope for the current system; video
//! uploads complete with empty text and a zero duration. This is
//! documented behavior, not an error path.

use async_trait::async_trait;

use crate::models::UploadKind;
use crate::services::error::ServiceResult;

use super::{ContentExtractor, ExtractionOutput};

/// Stub extractor for video uploads.
pub struct VideoExtractor;

impl VideoExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VideoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for VideoExtractor {
    async fn extract(&self, _data: &[u8]) -> ServiceResult<ExtractionOutput> {
        Ok(ExtractionOutput {
            text: String::new(),
            duration_seconds: Some(0),
            ..Default::default()
        })
    }

    fn supported_kinds(&self) -> Vec<UploadKind> {
        vec![UploadKind::Video]
    }

    fn name(&self) -> &str {
        "VideoExtractor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_returns_empty_text_and_zero_duration() {
        let extractor = VideoExtractor::new();
        let output = extractor.extract(b"fake mp4 bytes").await.unwrap();

        assert!(output.text.is_empty());
        assert_eq!(output.duration_seconds, Some(0));
    }
}
