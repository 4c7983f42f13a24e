//! Upload record and processing metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declared kind of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Pdf,
    Image,
    Text,
    Video,
    Link,
}

impl UploadKind {
    /// Parses a kind from its wire string.
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "image" => Some(Self::Image),
            "text" => Some(Self::Text),
            "video" => Some(Self::Video),
            "link" => Some(Self::Link),
            _ => None,
        }
    }

    /// Detects a kind from a filename extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "tiff" => Some(Self::Image),
            "txt" | "md" | "rst" | "text" | "markdown" => Some(Self::Text),
            "mp4" | "avi" | "mov" | "mkv" => Some(Self::Video),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::Text => "text",
            Self::Video => "video",
            Self::Link => "link",
        }
    }
}

/// Processing status of an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Processing,
    Completed,
    Failed,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Pixel dimensions of an image upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Metadata produced by one processing attempt.
///
/// Every field is typed and optional rather than an open JSON map, so
/// consumers can distinguish "absent" from "empty". The whole record is
/// replaced in a single write per attempt; fields from two different
/// attempts never mix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Plain text extracted from the file, if any.
    pub extracted_text: Option<String>,

    /// Page count (PDF uploads).
    pub pages: Option<u32>,

    /// Duration in seconds (video uploads).
    pub duration_seconds: Option<u32>,

    /// Pixel dimensions (image uploads).
    pub dimensions: Option<Dimensions>,

    /// Short summary derived from the extracted text.
    pub summary: Option<String>,

    /// Keyword list derived from the extracted text (ordered, may repeat).
    pub keywords: Vec<String>,

    /// Detected 2-letter language tag.
    pub language: Option<String>,
}

impl FileMetadata {
    /// True if any analysis-derived field is present.
    pub fn has_analysis(&self) -> bool {
        self.summary.is_some() || !self.keywords.is_empty() || self.language.is_some()
    }
}

/// An uploaded source document and its processing lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Upload {
    pub id: Uuid,

    /// Owning user; all store lookups are scoped by this.
    pub user_id: Uuid,

    /// Subject the upload belongs to (opaque here).
    pub subject_id: Uuid,

    /// Display name (usually the original filename).
    pub name: String,

    pub kind: UploadKind,

    /// Size in bytes.
    pub size: u64,

    /// Opaque storage reference returned by the object store.
    pub storage_ref: String,

    pub status: UploadStatus,

    /// Human-readable error from the last failed attempt.
    pub processing_error: Option<String>,

    /// When the last attempt finished (completed or failed).
    pub processed_at: Option<DateTime<Utc>>,

    /// Result of the last completed attempt.
    pub metadata: Option<FileMetadata>,

    pub created_at: DateTime<Utc>,
}

impl Upload {
    /// Creates a new upload in `processing` state.
    pub fn new(
        user_id: Uuid,
        subject_id: Uuid,
        name: String,
        kind: UploadKind,
        size: u64,
        storage_ref: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            subject_id,
            name,
            kind,
            size,
            storage_ref,
            status: UploadStatus::Processing,
            processing_error: None,
            processed_at: None,
            metadata: None,
            created_at: Utc::now(),
        }
    }

    /// Records a successful attempt, replacing all prior metadata.
    pub fn complete(&mut self, metadata: FileMetadata) {
        self.metadata = Some(metadata);
        self.status = UploadStatus::Completed;
        self.processing_error = None;
        self.processed_at = Some(Utc::now());
    }

    /// Records a failed attempt. Prior metadata is discarded so readers
    /// never see fields from an earlier run next to a failure.
    pub fn fail(&mut self, error: String) {
        self.metadata = None;
        self.status = UploadStatus::Failed;
        self.processing_error = Some(error);
        self.processed_at = Some(Utc::now());
    }

    /// Resets the record for a reprocessing attempt.
    pub fn reset_for_processing(&mut self) {
        self.status = UploadStatus::Processing;
        self.processing_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(UploadKind::from_extension("pdf"), Some(UploadKind::Pdf));
        assert_eq!(UploadKind::from_extension("PNG"), Some(UploadKind::Image));
        assert_eq!(UploadKind::from_extension("md"), Some(UploadKind::Text));
        assert_eq!(UploadKind::from_extension("mov"), Some(UploadKind::Video));
        assert_eq!(UploadKind::from_extension("exe"), None);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(UploadKind::from_str_opt("pdf"), Some(UploadKind::Pdf));
        assert_eq!(UploadKind::from_str_opt("LINK"), Some(UploadKind::Link));
        assert_eq!(UploadKind::from_str_opt("doc"), None);
    }

    #[test]
    fn test_complete_replaces_metadata() {
        let mut upload = Upload::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "notes.txt".to_string(),
            UploadKind::Text,
            42,
            "local://notes".to_string(),
        );
        assert_eq!(upload.status, UploadStatus::Processing);

        upload.complete(FileMetadata {
            extracted_text: Some("first run".to_string()),
            ..Default::default()
        });
        assert_eq!(upload.status, UploadStatus::Completed);
        assert!(upload.processed_at.is_some());

        upload.reset_for_processing();
        upload.complete(FileMetadata {
            extracted_text: Some("second run".to_string()),
            ..Default::default()
        });
        let meta = upload.metadata.as_ref().unwrap();
        assert_eq!(meta.extracted_text.as_deref(), Some("second run"));
    }

    #[test]
    fn test_fail_discards_metadata() {
        let mut upload = Upload::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "doc.pdf".to_string(),
            UploadKind::Pdf,
            10,
            "local://doc".to_string(),
        );
        upload.complete(FileMetadata::default());
        upload.reset_for_processing();
        upload.fail("corrupt file".to_string());

        assert_eq!(upload.status, UploadStatus::Failed);
        assert_eq!(upload.processing_error.as_deref(), Some("corrupt file"));
        assert!(upload.metadata.is_none());
    }
}
