/// Project model and database operations
///
/// A project owns its tasks and tools. Deleting a project removes both, and
/// through the tasks their comments and attachments.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     start_date DATE NOT NULL,
///     due_date DATE NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT projects_dates_ordered CHECK (due_date >= start_date)
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

/// Project model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,

    /// First day work may be scheduled
    pub start_date: NaiveDate,

    /// Last day work may be scheduled
    pub due_date: NaiveDate,

    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Returns true if `date` lies inside `[start_date, due_date]`
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.due_date
    }
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
}

const PROJECT_COLUMNS: &str = "id, title, description, start_date, due_date, created_at";

impl Project {
    /// Creates a new project
    ///
    /// Date rules are enforced by the caller; the table only guards
    /// `due_date >= start_date`.
    pub async fn create(conn: &mut PgConnection, data: CreateProject) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (title, description, start_date, due_date) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            PROJECT_COLUMNS
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(data.title)
            .bind(data.description)
            .bind(data.start_date)
            .bind(data.due_date)
            .fetch_one(&mut *conn)
            .await
    }

    /// Finds a project by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);

        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Lists all projects in creation order
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM projects ORDER BY created_at, id",
            PROJECT_COLUMNS
        );

        sqlx::query_as::<_, Project>(&query).fetch_all(&mut *conn).await
    }

    /// Deletes a project and, by cascade, everything it owns
    ///
    /// # Returns
    ///
    /// True if the project was deleted, false if it didn't exist
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
