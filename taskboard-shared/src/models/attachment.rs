/// Attachment model and database operations
///
/// Attachments store the uploaded file bytes inline. Listing returns
/// [`AttachmentInfo`] rows so payloads are only read on download.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE attachments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     filename VARCHAR(255) NOT NULL,
///     content_type VARCHAR(255) NOT NULL,
///     data BYTEA NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

/// Attachment including its payload
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Attachment {
    pub id: Uuid,
    pub task_id: Uuid,

    /// Filename as uploaded
    pub filename: String,

    /// Declared MIME type
    pub content_type: String,

    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    /// Metadata view of this attachment
    pub fn info(&self) -> AttachmentInfo {
        AttachmentInfo {
            id: self.id,
            task_id: self.task_id,
            filename: self.filename.clone(),
            content_type: self.content_type.clone(),
            size: self.data.len() as i64,
            created_at: self.created_at,
        }
    }
}

/// Attachment metadata without the payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttachmentInfo {
    pub id: Uuid,
    pub task_id: Uuid,
    pub filename: String,
    pub content_type: String,

    /// Payload size in bytes
    pub size: i64,

    pub created_at: DateTime<Utc>,
}

/// Input for storing an attachment
#[derive(Debug, Clone)]
pub struct CreateAttachment {
    pub task_id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

const ATTACHMENT_COLUMNS: &str = "id, task_id, filename, content_type, data, created_at";

const ATTACHMENT_INFO_COLUMNS: &str =
    "id, task_id, filename, content_type, octet_length(data)::BIGINT AS size, created_at";

impl Attachment {
    pub async fn create(
        conn: &mut PgConnection,
        data: CreateAttachment,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO attachments (task_id, filename, content_type, data) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            ATTACHMENT_COLUMNS
        );

        sqlx::query_as::<_, Attachment>(&query)
            .bind(data.task_id)
            .bind(data.filename)
            .bind(data.content_type)
            .bind(data.data)
            .fetch_one(&mut *conn)
            .await
    }

    /// Finds an attachment by ID, payload included
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM attachments WHERE id = $1", ATTACHMENT_COLUMNS);

        sqlx::query_as::<_, Attachment>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Lists attachment metadata for a task, newest first
    pub async fn list_by_task(
        conn: &mut PgConnection,
        task_id: Uuid,
    ) -> Result<Vec<AttachmentInfo>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM attachments WHERE task_id = $1 ORDER BY created_at DESC, id",
            ATTACHMENT_INFO_COLUMNS
        );

        sqlx::query_as::<_, AttachmentInfo>(&query)
            .bind(task_id)
            .fetch_all(&mut *conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_reports_payload_size() {
        let attachment = Attachment {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            filename: "invoice.PDF".to_string(),
            content_type: "application/pdf".to_string(),
            data: vec![0u8; 1024],
            created_at: Utc::now(),
        };

        let info = attachment.info();
        assert_eq!(info.size, 1024);
        assert_eq!(info.filename, "invoice.PDF");
        assert_eq!(info.task_id, attachment.task_id);
    }
}
