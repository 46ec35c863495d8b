/// PostgreSQL-backed store
///
/// Each session wraps one sqlx transaction. The model queries in
/// [`crate::models`] run against the transaction's connection; dropping the
/// session before [`Store::commit`] rolls the transaction back.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{Database, Store, StoreError, StoreResult};
use crate::db::pool::health_check;
use crate::models::attachment::{Attachment, AttachmentInfo, CreateAttachment};
use crate::models::comment::{Comment, CreateComment};
use crate::models::project::{CreateProject, Project};
use crate::models::task::{CreateTask, Task};
use crate::models::tool::{CreateTool, Tool};
use crate::models::user::{CreateUser, Role, User};

/// Session factory over a connection pool
#[derive(Debug, Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn begin(&self) -> StoreResult<Box<dyn Store>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgStore { tx: Some(tx) }))
    }

    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }
}

/// One open transaction
pub struct PgStore {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgStore {
    fn conn(&mut self) -> StoreResult<&mut PgConnection> {
        self.tx.as_deref_mut().ok_or(StoreError::SessionClosed)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&mut self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(self.conn()?, data).await?)
    }

    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(self.conn()?, id).await?)
    }

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(self.conn()?, email).await?)
    }

    async fn list_users(&mut self) -> StoreResult<Vec<User>> {
        Ok(User::list(self.conn()?).await?)
    }

    async fn set_user_role(&mut self, id: Uuid, role: Role) -> StoreResult<Option<User>> {
        Ok(User::set_role(self.conn()?, id, role).await?)
    }

    async fn delete_user(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(User::delete(self.conn()?, id).await?)
    }

    async fn create_project(&mut self, data: CreateProject) -> StoreResult<Project> {
        Ok(Project::create(self.conn()?, data).await?)
    }

    async fn find_project(&mut self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(self.conn()?, id).await?)
    }

    async fn list_projects(&mut self) -> StoreResult<Vec<Project>> {
        Ok(Project::list(self.conn()?).await?)
    }

    async fn delete_project(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(Project::delete(self.conn()?, id).await?)
    }

    async fn create_task(&mut self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(self.conn()?, data).await?)
    }

    async fn find_task(&mut self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(self.conn()?, id).await?)
    }

    async fn list_tasks_by_project(&mut self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_project(self.conn()?, project_id).await?)
    }

    async fn list_tasks_by_tool(&mut self, tool_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_tool(self.conn()?, tool_id).await?)
    }

    async fn list_tasks_assigned_to(&mut self, user_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(Task::list_assigned_to(self.conn()?, user_id).await?)
    }

    async fn save_task(&mut self, task: &Task) -> StoreResult<Option<Task>> {
        Ok(Task::save(self.conn()?, task).await?)
    }

    async fn delete_task(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete(self.conn()?, id).await?)
    }

    async fn create_comment(&mut self, data: CreateComment) -> StoreResult<Comment> {
        Ok(Comment::create(self.conn()?, data).await?)
    }

    async fn find_comment(&mut self, id: Uuid) -> StoreResult<Option<Comment>> {
        Ok(Comment::find_by_id(self.conn()?, id).await?)
    }

    async fn list_comments_by_task(&mut self, task_id: Uuid) -> StoreResult<Vec<Comment>> {
        Ok(Comment::list_by_task(self.conn()?, task_id).await?)
    }

    async fn update_comment_content(
        &mut self,
        id: Uuid,
        content: &str,
    ) -> StoreResult<Option<Comment>> {
        Ok(Comment::update_content(self.conn()?, id, content).await?)
    }

    async fn delete_comment(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(Comment::delete(self.conn()?, id).await?)
    }

    async fn create_tool(&mut self, data: CreateTool) -> StoreResult<Tool> {
        Ok(Tool::create(self.conn()?, data).await?)
    }

    async fn find_tool(&mut self, id: Uuid) -> StoreResult<Option<Tool>> {
        Ok(Tool::find_by_id(self.conn()?, id).await?)
    }

    async fn list_tools_by_project(&mut self, project_id: Uuid) -> StoreResult<Vec<Tool>> {
        Ok(Tool::list_by_project(self.conn()?, project_id).await?)
    }

    async fn delete_tool(&mut self, id: Uuid) -> StoreResult<bool> {
        Ok(Tool::delete(self.conn()?, id).await?)
    }

    async fn create_attachment(&mut self, data: CreateAttachment) -> StoreResult<Attachment> {
        Ok(Attachment::create(self.conn()?, data).await?)
    }

    async fn find_attachment(&mut self, id: Uuid) -> StoreResult<Option<Attachment>> {
        Ok(Attachment::find_by_id(self.conn()?, id).await?)
    }

    async fn list_attachments_by_task(
        &mut self,
        task_id: Uuid,
    ) -> StoreResult<Vec<AttachmentInfo>> {
        Ok(Attachment::list_by_task(self.conn()?, task_id).await?)
    }

    async fn commit(&mut self) -> StoreResult<()> {
        let tx = self.tx.take().ok_or(StoreError::SessionClosed)?;
        tx.commit().await?;
        Ok(())
    }
}
