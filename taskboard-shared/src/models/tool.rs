/// Tool model and database operations
///
/// Tools are named tags scoped to a project. A task may reference one tool
/// of its own project; deleting the tool clears that reference.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tools (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

/// Tool tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tool {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTool {
    pub project_id: Uuid,
    pub name: String,
}

const TOOL_COLUMNS: &str = "id, project_id, name, created_at";

impl Tool {
    pub async fn create(conn: &mut PgConnection, data: CreateTool) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO tools (project_id, name) VALUES ($1, $2) RETURNING {}",
            TOOL_COLUMNS
        );

        sqlx::query_as::<_, Tool>(&query)
            .bind(data.project_id)
            .bind(data.name)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM tools WHERE id = $1", TOOL_COLUMNS);

        sqlx::query_as::<_, Tool>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Lists the tools of a project in creation order
    pub async fn list_by_project(
        conn: &mut PgConnection,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tools WHERE project_id = $1 ORDER BY created_at, id",
            TOOL_COLUMNS
        );

        sqlx::query_as::<_, Tool>(&query)
            .bind(project_id)
            .fetch_all(&mut *conn)
            .await
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tools WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
