//! Image OCR content extractor.
//!
//! This module requires the `ocr` feature to be enabled.

use async_trait::async_trait;
use image::GenericImageView;

use crate::models::{Dimensions, UploadKind};
use crate::services::error::{ServiceError, ServiceResult};

use super::{extraction_error, ContentExtractor, ExtractionOutput};

/// Extractor for images using Tesseract OCR.
pub struct ImageExtractor {
    /// Tesseract language string (e.g. "ita+eng" for multilingual).
    languages: String,
}

impl ImageExtractor {
    /// Creates an extractor recognizing Italian and English.
    pub fn new() -> Self {
        Self {
            languages: "ita+eng".to_string(),
        }
    }

    /// Creates an extractor with a specific language string.
    pub fn with_languages(languages: &str) -> Self {
        Self {
            languages: languages.to_string(),
        }
    }

    /// Reads pixel dimensions from the decoded image.
    fn image_dimensions(&self, data: &[u8]) -> ServiceResult<Dimensions> {
        let decoded = image::load_from_memory(data)
            .map_err(|e| extraction_error("failed to decode image", e))?;

        let (width, height) = decoded.dimensions();
        Ok(Dimensions { width, height })
    }

    /// Runs OCR over the image bytes.
    fn perform_ocr(&self, data: &[u8]) -> ServiceResult<String> {
        use tesseract::Tesseract;

        let tess = Tesseract::new(None, Some(&self.languages))
            .map_err(|e| extraction_error("failed to initialize Tesseract", e))?;

        let mut tess = tess
            .set_image_from_mem(data)
            .map_err(|e| extraction_error("failed to load image for OCR", e))?;

        let text = tess
            .get_text()
            .map_err(|e| extraction_error("OCR failed", e))?;

        Ok(text.trim().to_string())
    }
}

impl Default for ImageExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for ImageExtractor {
    async fn extract(&self, data: &[u8]) -> ServiceResult<ExtractionOutput> {
        if data.is_empty() {
            return Err(ServiceError::Extraction("empty image input".to_string()));
        }

        // Decoding doubles as the corrupt-input check
        let dimensions = self.image_dimensions(data)?;
        let text = self.perform_ocr(data)?;

        Ok(ExtractionOutput {
            text,
            dimensions: Some(dimensions),
            ..Default::default()
        })
    }

    fn supported_kinds(&self) -> Vec<UploadKind> {
        vec![UploadKind::Image]
    }

    fn name(&self) -> &str {
        "ImageExtractor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_languages() {
        let extractor = ImageExtractor::new();
        assert_eq!(extractor.languages, "ita+eng");
    }

    #[test]
    fn test_with_languages() {
        let extractor = ImageExtractor::with_languages("deu");
        assert_eq!(extractor.languages, "deu");
    }

    #[tokio::test]
    async fn test_extract_empty_fails() {
        let extractor = ImageExtractor::new();
        let result = extractor.extract(&[]).await;
        assert!(matches!(result, Err(ServiceError::Extraction(_))));
    }

    #[tokio::test]
    async fn test_extract_not_an_image_fails() {
        let extractor = ImageExtractor::new();
        let result = extractor.extract(b"definitely not an image").await;
        assert!(matches!(result, Err(ServiceError::Extraction(_))));
    }
}
