/// Task attachments
///
/// Only `.eml` and `.pdf` files are accepted, judged by the file name's
/// extension without regard to case. File names are limited to
/// [`MAX_FILENAME_LENGTH`] characters. Payloads are stored as-is.

use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, Operation};
use crate::models::attachment::{Attachment, AttachmentInfo, CreateAttachment};
use crate::models::user::User;
use crate::store::Store;

/// Accepted file extensions, lowercase with the leading dot
pub const ALLOWED_EXTENSIONS: [&str; 2] = [".eml", ".pdf"];

/// Content type recorded when the upload does not declare a usable one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Longest accepted file name, in characters
pub const MAX_FILENAME_LENGTH: usize = 255;

const MAX_CONTENT_TYPE_LENGTH: usize = 255;

const UNSUPPORTED_FILE: &str = "Only .eml or .pdf files are allowed";

/// An uploaded file
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

pub fn is_allowed_filename(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Stores `upload` on a task and returns its metadata
///
/// # Errors
///
/// - `ServiceError::UnsupportedMediaType` if the extension is not allowed
/// - `ServiceError::Validation` if the file name is too long
/// - `ServiceError::NotFound` if the task is missing
pub async fn upload_attachment(
    store: &mut dyn Store,
    actor: &User,
    task_id: Uuid,
    upload: Upload,
) -> ServiceResult<AttachmentInfo> {
    authorize(actor, Operation::UploadAttachment)?;

    if !is_allowed_filename(&upload.filename) {
        return Err(ServiceError::UnsupportedMediaType(UNSUPPORTED_FILE.to_string()));
    }
    if upload.filename.chars().count() > MAX_FILENAME_LENGTH {
        return Err(ServiceError::Validation(format!(
            "File name must be at most {} characters",
            MAX_FILENAME_LENGTH
        )));
    }

    if store.find_task(task_id).await?.is_none() {
        return Err(ServiceError::NotFound("Task"));
    }

    let content_type = upload
        .content_type
        .filter(|ct| !ct.trim().is_empty() && ct.len() <= MAX_CONTENT_TYPE_LENGTH)
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    let attachment = store
        .create_attachment(CreateAttachment {
            task_id,
            filename: upload.filename,
            content_type,
            data: upload.data,
        })
        .await?;

    info!(
        actor_id = %actor.id,
        task_id = %task_id,
        attachment_id = %attachment.id,
        size = attachment.data.len(),
        "Attachment uploaded"
    );
    Ok(attachment.info())
}

/// Attachment metadata of a task, newest first
pub async fn list_attachments(
    store: &mut dyn Store,
    actor: &User,
    task_id: Uuid,
) -> ServiceResult<Vec<AttachmentInfo>> {
    authorize(actor, Operation::ListAttachments)?;
    Ok(store.list_attachments_by_task(task_id).await?)
}

/// Loads an attachment with its payload
pub async fn download_attachment(
    store: &mut dyn Store,
    actor: &User,
    attachment_id: Uuid,
) -> ServiceResult<Attachment> {
    authorize(actor, Operation::DownloadAttachment)?;

    store
        .find_attachment(attachment_id)
        .await?
        .ok_or(ServiceError::NotFound("Attachment"))
}
