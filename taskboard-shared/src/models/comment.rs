/// Comment model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     content TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

/// Comment left by a user on a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub task_id: Uuid,

    /// Author
    pub user_id: Uuid,

    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Returns true if `user_id` wrote this comment
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Input for creating a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
}

const COMMENT_COLUMNS: &str = "id, task_id, user_id, content, created_at";

impl Comment {
    pub async fn create(conn: &mut PgConnection, data: CreateComment) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (task_id, user_id, content) VALUES ($1, $2, $3) RETURNING {}",
            COMMENT_COLUMNS
        );

        sqlx::query_as::<_, Comment>(&query)
            .bind(data.task_id)
            .bind(data.user_id)
            .bind(data.content)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS);

        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Lists the comments on a task, oldest first
    pub async fn list_by_task(
        conn: &mut PgConnection,
        task_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM comments WHERE task_id = $1 ORDER BY created_at, id",
            COMMENT_COLUMNS
        );

        sqlx::query_as::<_, Comment>(&query)
            .bind(task_id)
            .fetch_all(&mut *conn)
            .await
    }

    /// Replaces the content of a comment
    pub async fn update_content(
        conn: &mut PgConnection,
        id: Uuid,
        content: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE comments SET content = $2 WHERE id = $1 RETURNING {}",
            COMMENT_COLUMNS
        );

        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(content)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
