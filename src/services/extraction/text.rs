//! Plain text content extractor.

use async_trait::async_trait;

use crate::models::UploadKind;
use crate::services::error::{ServiceError, ServiceResult};

use super::{ContentExtractor, ExtractionOutput};

/// Extractor for plain text uploads.
///
/// Decodes bytes as strict UTF-8 and returns the text unchanged. Invalid
/// encoding is an extraction error, never a lossy substitution.
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for TextExtractor {
    async fn extract(&self, data: &[u8]) -> ServiceResult<ExtractionOutput> {
        let text = std::str::from_utf8(data)
            .map_err(|e| ServiceError::Extraction(format!("invalid UTF-8 text: {}", e)))?;

        Ok(ExtractionOutput::text_only(text.to_string()))
    }

    fn supported_kinds(&self) -> Vec<UploadKind> {
        vec![UploadKind::Text]
    }

    fn name(&self) -> &str {
        "TextExtractor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip_identity() {
        let extractor = TextExtractor::new();
        let input = "Il gatto mangia.\nIl cane corre.  Spaces   kept.";

        let output = extractor.extract(input.as_bytes()).await.unwrap();

        assert_eq!(output.text, input);
        assert!(output.pages.is_none());
        assert!(output.dimensions.is_none());
    }

    #[tokio::test]
    async fn test_invalid_utf8_fails() {
        let extractor = TextExtractor::new();
        let result = extractor.extract(&[0xFF, 0xFE, 0x80]).await;

        assert!(matches!(result, Err(ServiceError::Extraction(_))));
    }

    #[tokio::test]
    async fn test_empty_input_is_empty_text() {
        let extractor = TextExtractor::new();
        let output = extractor.extract(&[]).await.unwrap();
        assert_eq!(output.text, "");
    }
}
