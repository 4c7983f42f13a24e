//! Content extractors for the supported upload kinds.
//!
//! An extractor is a pure function of the input bytes: no hidden state and
//! no I/O beyond what is passed in. Corrupt input for the declared kind is
//! an extraction error; the orchestrator turns it into a `failed` record.

pub mod text;
pub mod video;

#[cfg(feature = "pdf")]
pub mod pdf;

#[cfg(feature = "ocr")]
pub mod image;

use async_trait::async_trait;

use crate::models::{Dimensions, UploadKind};

use super::error::{ServiceError, ServiceResult};

/// Result of content extraction for one upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionOutput {
    /// Extracted plain text (may be empty for media kinds).
    pub text: String,

    /// Page count (PDF).
    pub pages: Option<u32>,

    /// Duration in seconds (video).
    pub duration_seconds: Option<u32>,

    /// Pixel dimensions (image).
    pub dimensions: Option<Dimensions>,
}

impl ExtractionOutput {
    /// Creates an output holding only text.
    pub fn text_only(text: String) -> Self {
        Self {
            text,
            ..Default::default()
        }
    }
}

/// Trait for per-kind content extractors.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Extracts text and structural metadata from raw bytes.
    async fn extract(&self, data: &[u8]) -> ServiceResult<ExtractionOutput>;

    /// Upload kinds this extractor handles.
    fn supported_kinds(&self) -> Vec<UploadKind>;

    /// Checks whether this extractor handles a given kind.
    fn supports(&self, kind: UploadKind) -> bool {
        self.supported_kinds().contains(&kind)
    }

    /// Extractor name, for logging.
    fn name(&self) -> &str;
}

/// Factory for creating extractors by upload kind.
pub struct ExtractorFactory;

impl ExtractorFactory {
    /// Creates an extractor for the given kind.
    ///
    /// `ocr_languages` is Tesseract language syntax (e.g. "ita+eng") and
    /// only affects image extraction. Returns `None` for kinds with no
    /// extractor in this build (`link`, or `image` without the `ocr`
    /// feature).
    #[allow(unused_variables)]
    pub fn create(kind: UploadKind, ocr_languages: &str) -> Option<Box<dyn ContentExtractor>> {
        match kind {
            UploadKind::Text => Some(Box::new(text::TextExtractor::new())),
            UploadKind::Video => Some(Box::new(video::VideoExtractor::new())),
            #[cfg(feature = "pdf")]
            UploadKind::Pdf => Some(Box::new(pdf::PdfExtractor::new())),
            #[cfg(not(feature = "pdf"))]
            UploadKind::Pdf => None,
            #[cfg(feature = "ocr")]
            UploadKind::Image => Some(Box::new(image::ImageExtractor::with_languages(
                ocr_languages,
            ))),
            #[cfg(not(feature = "ocr"))]
            UploadKind::Image => None,
            UploadKind::Link => None,
        }
    }
}

/// Maps a parser failure into an extraction error with context.
pub(crate) fn extraction_error(context: &str, detail: impl std::fmt::Display) -> ServiceError {
    ServiceError::Extraction(format!("{}: {}", context, detail))
}

// Re-exports
pub use text::TextExtractor;
pub use video::VideoExtractor;

#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;

#[cfg(feature = "ocr")]
pub use image::ImageExtractor;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_text() {
        let extractor = ExtractorFactory::create(UploadKind::Text, "eng").unwrap();
        assert!(extractor.supports(UploadKind::Text));
        assert!(!extractor.supports(UploadKind::Pdf));
    }

    #[test]
    fn test_factory_video_stub() {
        assert!(ExtractorFactory::create(UploadKind::Video, "eng").is_some());
    }

    #[test]
    fn test_factory_link_has_no_extractor() {
        assert!(ExtractorFactory::create(UploadKind::Link, "eng").is_none());
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_factory_pdf() {
        assert!(ExtractorFactory::create(UploadKind::Pdf, "eng").is_some());
    }
}
