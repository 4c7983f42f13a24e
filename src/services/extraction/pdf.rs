//! PDF content extractor.
//!
//! This module requires the `pdf` feature to be enabled.

use async_trait::async_trait;

use crate::models::UploadKind;
use crate::services::error::{ServiceError, ServiceResult};

use super::{extraction_error, ContentExtractor, ExtractionOutput};

/// Extractor for PDF documents.
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts the concatenated page text.
    fn extract_pdf_text(&self, data: &[u8]) -> ServiceResult<String> {
        let text = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| extraction_error("failed to extract PDF text", e))?;

        Ok(text.trim().to_string())
    }

    /// Counts the pages in the document.
    fn count_pdf_pages(&self, data: &[u8]) -> ServiceResult<u32> {
        let document = lopdf::Document::load_mem(data)
            .map_err(|e| extraction_error("failed to parse PDF", e))?;

        Ok(document.get_pages().len() as u32)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for PdfExtractor {
    async fn extract(&self, data: &[u8]) -> ServiceResult<ExtractionOutput> {
        if data.is_empty() {
            return Err(ServiceError::Extraction("empty PDF input".to_string()));
        }

        // Cheap structural check before handing bytes to the parser
        if !data.starts_with(b"%PDF") {
            return Err(ServiceError::Extraction(
                "invalid PDF file (missing %PDF header)".to_string(),
            ));
        }

        let pages = self.count_pdf_pages(data)?;
        let text = self.extract_pdf_text(data)?;

        Ok(ExtractionOutput {
            text,
            pages: Some(pages),
            ..Default::default()
        })
    }

    fn supported_kinds(&self) -> Vec<UploadKind> {
        vec![UploadKind::Pdf]
    }

    fn name(&self) -> &str {
        "PdfExtractor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_extract_empty_fails() {
        let extractor = PdfExtractor::new();
        let result = extractor.extract(&[]).await;
        assert!(matches!(result, Err(ServiceError::Extraction(_))));
    }

    #[tokio::test]
    async fn test_extract_not_a_pdf_fails() {
        let extractor = PdfExtractor::new();
        let result = extractor.extract(b"plain text, not a pdf").await;
        assert!(matches!(result, Err(ServiceError::Extraction(_))));
    }

    #[tokio::test]
    async fn test_extract_corrupt_pdf_fails_with_message() {
        let extractor = PdfExtractor::new();
        // Valid header, garbage body
        let result = extractor.extract(b"%PDF-1.4 garbage body").await;

        let err = result.expect_err("corrupt pdf must fail");
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_supported_kinds() {
        let extractor = PdfExtractor::new();
        assert!(extractor.supports(UploadKind::Pdf));
        assert!(!extractor.supports(UploadKind::Image));
    }
}
