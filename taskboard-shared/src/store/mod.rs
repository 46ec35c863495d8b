/// Request-scoped persistence sessions
///
/// Business rules in [`crate::services`] never talk to PostgreSQL directly.
/// They receive a [`Store`]: one transactional session opened by
/// [`Database::begin`], used for a single request, then committed with
/// [`Store::commit`]. Dropping a store without committing discards every
/// change made through it.
///
/// # Implementations
///
/// - [`postgres::PgDatabase`]: sqlx transaction per session
/// - [`memory::MemoryDatabase`]: in-process tables used by tests
///
/// # Example
///
/// ```
/// use taskboard_shared::models::user::{CreateUser, Role};
/// use taskboard_shared::store::{memory::MemoryDatabase, Database};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let db = MemoryDatabase::new();
///
/// let mut store = db.begin().await?;
/// store.create_user(CreateUser {
///     username: "jane".to_string(),
///     email: "jane@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: Role::Member,
/// }).await?;
/// store.commit().await?;
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::attachment::{Attachment, AttachmentInfo, CreateAttachment};
use crate::models::comment::{Comment, CreateComment};
use crate::models::project::{CreateProject, Project};
use crate::models::task::{CreateTask, Task};
use crate::models::tool::{CreateTool, Tool};
use crate::models::user::{CreateUser, Role, User};

/// Postgres SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres SQLSTATE for foreign key violations
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Persistence error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A referenced row does not exist
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// The session was already committed
    #[error("Store session is closed")]
    SessionClosed,

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();

            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return StoreError::UniqueViolation(constraint),
                Some(FOREIGN_KEY_VIOLATION) => return StoreError::ForeignKeyViolation(constraint),
                _ => {}
            }
        }

        StoreError::Database(err)
    }
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// One transactional persistence session
///
/// Lookups return `Ok(None)` for missing rows; deletes return `Ok(false)`.
/// Deleting a parent removes its dependents:
///
/// - project: its tools, its tasks, and their comments and attachments
/// - task: its comments and attachments
/// - user: their comments; tasks assigned to them become unassigned
/// - tool: tasks tagged with it lose the tag
#[async_trait]
pub trait Store: Send {
    async fn create_user(&mut self, data: CreateUser) -> StoreResult<User>;
    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>>;
    async fn list_users(&mut self) -> StoreResult<Vec<User>>;
    async fn set_user_role(&mut self, id: Uuid, role: Role) -> StoreResult<Option<User>>;
    async fn delete_user(&mut self, id: Uuid) -> StoreResult<bool>;

    async fn create_project(&mut self, data: CreateProject) -> StoreResult<Project>;
    async fn find_project(&mut self, id: Uuid) -> StoreResult<Option<Project>>;
    async fn list_projects(&mut self) -> StoreResult<Vec<Project>>;
    async fn delete_project(&mut self, id: Uuid) -> StoreResult<bool>;

    async fn create_task(&mut self, data: CreateTask) -> StoreResult<Task>;
    async fn find_task(&mut self, id: Uuid) -> StoreResult<Option<Task>>;
    async fn list_tasks_by_project(&mut self, project_id: Uuid) -> StoreResult<Vec<Task>>;
    async fn list_tasks_by_tool(&mut self, tool_id: Uuid) -> StoreResult<Vec<Task>>;
    async fn list_tasks_assigned_to(&mut self, user_id: Uuid) -> StoreResult<Vec<Task>>;

    /// Writes back every mutable field of `task`
    async fn save_task(&mut self, task: &Task) -> StoreResult<Option<Task>>;
    async fn delete_task(&mut self, id: Uuid) -> StoreResult<bool>;

    async fn create_comment(&mut self, data: CreateComment) -> StoreResult<Comment>;
    async fn find_comment(&mut self, id: Uuid) -> StoreResult<Option<Comment>>;
    async fn list_comments_by_task(&mut self, task_id: Uuid) -> StoreResult<Vec<Comment>>;
    async fn update_comment_content(
        &mut self,
        id: Uuid,
        content: &str,
    ) -> StoreResult<Option<Comment>>;
    async fn delete_comment(&mut self, id: Uuid) -> StoreResult<bool>;

    async fn create_tool(&mut self, data: CreateTool) -> StoreResult<Tool>;
    async fn find_tool(&mut self, id: Uuid) -> StoreResult<Option<Tool>>;
    async fn list_tools_by_project(&mut self, project_id: Uuid) -> StoreResult<Vec<Tool>>;
    async fn delete_tool(&mut self, id: Uuid) -> StoreResult<bool>;

    async fn create_attachment(&mut self, data: CreateAttachment) -> StoreResult<Attachment>;
    async fn find_attachment(&mut self, id: Uuid) -> StoreResult<Option<Attachment>>;

    /// Attachment metadata for a task, newest first
    async fn list_attachments_by_task(&mut self, task_id: Uuid)
        -> StoreResult<Vec<AttachmentInfo>>;

    /// Makes every change in this session durable
    ///
    /// The session cannot be used afterwards; further calls fail with
    /// [`StoreError::SessionClosed`].
    async fn commit(&mut self) -> StoreResult<()>;
}

/// Source of store sessions
#[async_trait]
pub trait Database: Send + Sync {
    /// Opens a new session
    async fn begin(&self) -> StoreResult<Box<dyn Store>>;

    /// Checks that the backing storage is reachable
    async fn ping(&self) -> StoreResult<()>;
}
