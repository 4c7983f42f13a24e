//! Gathering extracted text from a user's processed uploads.

use std::sync::Arc;

use uuid::Uuid;

use crate::store::DocumentStore;

use super::error::{ServiceError, ServiceResult};

/// Concatenates the extracted text of the given uploads, newest request
/// order preserved, one newline between documents.
///
/// Uploads that do not exist for the user, are unprocessed, or carry no
/// text are skipped. Returns `ServiceError::Validation` when nothing
/// usable remains.
pub async fn collect_extracted_text(
    store: &Arc<dyn DocumentStore>,
    user_id: Uuid,
    upload_ids: &[Uuid],
) -> ServiceResult<String> {
    let mut content = String::new();

    for upload_id in upload_ids {
        let Some(upload) = store.get_upload(*upload_id, user_id).await? else {
            continue;
        };
        let Some(metadata) = upload.metadata else {
            continue;
        };
        if let Some(text) = metadata.extracted_text {
            if !text.trim().is_empty() {
                content.push_str(&text);
                content.push('\n');
            }
        }
    }

    if content.trim().is_empty() {
        return Err(ServiceError::Validation(
            "no extracted content available in the selected uploads".to_string(),
        ));
    }

    Ok(content)
}
