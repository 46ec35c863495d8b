/// Task model and database operations
///
/// Tasks belong to a project and carry their own schedule inside the
/// project's date window. The `status` field is free text; the only value
/// the system interprets is [`STATUS_COMPLETED`].
///
/// # Lifecycle
///
/// ```text
/// created → [updated]* → deleted
/// ```
///
/// Every due date change after creation sets `due_date_edited` and records
/// the reason given with the change.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     status VARCHAR(64) NOT NULL DEFAULT 'pending',
///     start_date DATE NOT NULL,
///     due_date DATE NOT NULL,
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     tool_id UUID REFERENCES tools(id) ON DELETE SET NULL,
///     due_date_edited BOOLEAN NOT NULL DEFAULT FALSE,
///     due_date_change_reason TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use taskboard_shared::models::task::{CreateTask, Task};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(project_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let mut conn = pool.acquire().await?;
///
/// let task = Task::create(&mut conn, CreateTask {
///     project_id,
///     title: "Draft copy".to_string(),
///     description: "Landing page text".to_string(),
///     start_date: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
///     due_date: NaiveDate::from_ymd_opt(2030, 1, 12).unwrap(),
///     assigned_to: None,
///     tool_id: None,
/// }).await?;
///
/// assert_eq!(task.status, "pending");
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

/// Status assigned to new tasks
pub const STATUS_PENDING: &str = "pending";

/// Status that marks a task as done
pub const STATUS_COMPLETED: &str = "completed";

/// Number of days ahead that counts as "due soon"
pub const DUE_SOON_DAYS: i64 = 2;

/// Task model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,

    /// Owning project
    pub project_id: Uuid,

    pub title: String,
    pub description: String,

    /// Free-form status, "pending" on creation
    pub status: String,

    pub start_date: NaiveDate,
    pub due_date: NaiveDate,

    /// Assignee, if any
    pub assigned_to: Option<Uuid>,

    /// Tool tag, if any (always a tool of the same project)
    pub tool_id: Option<Uuid>,

    /// Set once the due date has been changed after creation
    pub due_date_edited: bool,

    /// Reason recorded with the most recent due date change
    pub due_date_change_reason: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Returns true if the status is "completed"
    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }

    /// Open task whose due date has been reached
    ///
    /// A due date means midnight at the start of that day, so a task due
    /// today is already late.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed() && self.due_date <= today
    }

    /// Open task due within the next [`DUE_SOON_DAYS`] days, today excluded
    pub fn is_due_soon(&self, today: NaiveDate) -> bool {
        !self.is_completed()
            && self.due_date > today
            && self.due_date <= today + Duration::days(DUE_SOON_DAYS)
    }
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub assigned_to: Option<Uuid>,
    pub tool_id: Option<Uuid>,
}

const TASK_COLUMNS: &str = "id, project_id, title, description, status, start_date, due_date, \
                            assigned_to, tool_id, due_date_edited, due_date_change_reason, created_at";

impl Task {
    /// Creates a new task with status "pending"
    ///
    /// # Errors
    ///
    /// Returns a foreign key error if the project, assignee or tool is missing
    pub async fn create(conn: &mut PgConnection, data: CreateTask) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (project_id, title, description, status, start_date, due_date, \
                                assigned_to, tool_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(data.project_id)
            .bind(data.title)
            .bind(data.description)
            .bind(STATUS_PENDING)
            .bind(data.start_date)
            .bind(data.due_date)
            .bind(data.assigned_to)
            .bind(data.tool_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Finds a task by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);

        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Lists the tasks of a project in creation order
    pub async fn list_by_project(
        conn: &mut PgConnection,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE project_id = $1 ORDER BY created_at, id",
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(&mut *conn)
            .await
    }

    /// Lists the tasks tagged with a tool
    pub async fn list_by_tool(
        conn: &mut PgConnection,
        tool_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE tool_id = $1 ORDER BY created_at, id",
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(tool_id)
            .fetch_all(&mut *conn)
            .await
    }

    /// Lists the tasks assigned to a user
    pub async fn list_assigned_to(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE assigned_to = $1 ORDER BY due_date, id",
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await
    }

    /// Writes every mutable column of `task` back to its row
    ///
    /// `id`, `project_id` and `created_at` are never changed.
    ///
    /// # Returns
    ///
    /// The stored task, or None if the row no longer exists
    pub async fn save(conn: &mut PgConnection, task: &Task) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET title = $2, description = $3, status = $4, start_date = $5, \
                              due_date = $6, assigned_to = $7, tool_id = $8, \
                              due_date_edited = $9, due_date_change_reason = $10 \
             WHERE id = $1 RETURNING {}",
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(&task.status)
            .bind(task.start_date)
            .bind(task.due_date)
            .bind(task.assigned_to)
            .bind(task.tool_id)
            .bind(task.due_date_edited)
            .bind(&task.due_date_change_reason)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Deletes a task along with its comments and attachments
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
