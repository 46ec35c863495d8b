/// In-memory store
///
/// Keeps every table in process memory and reproduces the constraints of the
/// PostgreSQL schema: unique emails, foreign keys and the cascade rules
/// documented on [`Store`]. Used by the service and API tests.
///
/// A session holds the database lock for its whole lifetime and works on a
/// private copy of the tables. `commit` publishes the copy; dropping the
/// session throws it away. Sessions are therefore serialized; a task that
/// opens a second session while holding the first will wait forever.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{Database, Store, StoreError, StoreResult};
use crate::models::attachment::{Attachment, AttachmentInfo, CreateAttachment};
use crate::models::comment::{Comment, CreateComment};
use crate::models::project::{CreateProject, Project};
use crate::models::task::{CreateTask, Task, STATUS_PENDING};
use crate::models::tool::{CreateTool, Tool};
use crate::models::user::{CreateUser, Role, User};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: Vec<User>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    comments: Vec<Comment>,
    tools: Vec<Tool>,
    attachments: Vec<Attachment>,
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub users: usize,
    pub projects: usize,
    pub tasks: usize,
    pub comments: usize,
    pub tools: usize,
    pub attachments: usize,
}

/// Shared in-memory database
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts committed rows in every table
    pub async fn table_counts(&self) -> TableCounts {
        let tables = self.tables.lock().await;

        TableCounts {
            users: tables.users.len(),
            projects: tables.projects.len(),
            tasks: tables.tasks.len(),
            comments: tables.comments.len(),
            tools: tables.tools.len(),
            attachments: tables.attachments.len(),
        }
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn begin(&self) -> StoreResult<Box<dyn Store>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = Tables::clone(&guard);

        Ok(Box::new(MemoryStore {
            guard: Some(guard),
            working,
        }))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Session over a [`MemoryDatabase`]
pub struct MemoryStore {
    guard: Option<OwnedMutexGuard<Tables>>,
    working: Tables,
}

impl MemoryStore {
    fn tables(&mut self) -> StoreResult<&mut Tables> {
        if self.guard.is_none() {
            return Err(StoreError::SessionClosed);
        }
        Ok(&mut self.working)
    }
}

fn fk(constraint: &str) -> StoreError {
    StoreError::ForeignKeyViolation(constraint.to_string())
}

impl Tables {
    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn check_task_refs(&self, task: &Task) -> StoreResult<()> {
        if !self.projects.iter().any(|p| p.id == task.project_id) {
            return Err(fk("tasks_project_id_fkey"));
        }
        if let Some(user_id) = task.assigned_to {
            if !self.user_exists(user_id) {
                return Err(fk("tasks_assigned_to_fkey"));
            }
        }
        if let Some(tool_id) = task.tool_id {
            if !self.tools.iter().any(|t| t.id == tool_id) {
                return Err(fk("tasks_tool_id_fkey"));
            }
        }
        Ok(())
    }

    fn remove_tasks(&mut self, doomed: &[Uuid]) {
        self.comments.retain(|c| !doomed.contains(&c.task_id));
        self.attachments.retain(|a| !doomed.contains(&a.task_id));
        self.tasks.retain(|t| !doomed.contains(&t.id));
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&mut self, data: CreateUser) -> StoreResult<User> {
        let tables = self.tables()?;

        if tables.users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            role: data.role,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.tables()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&mut self) -> StoreResult<Vec<User>> {
        Ok(self.tables()?.users.clone())
    }

    async fn set_user_role(&mut self, id: Uuid, role: Role) -> StoreResult<Option<User>> {
        let tables = self.tables()?;

        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.role = role;
            user.clone()
        }))
    }

    async fn delete_user(&mut self, id: Uuid) -> StoreResult<bool> {
        let tables = self.tables()?;

        if !tables.user_exists(id) {
            return Ok(false);
        }

        tables.comments.retain(|c| c.user_id != id);
        for task in tables.tasks.iter_mut().filter(|t| t.assigned_to == Some(id)) {
            task.assigned_to = None;
        }
        tables.users.retain(|u| u.id != id);
        Ok(true)
    }

    async fn create_project(&mut self, data: CreateProject) -> StoreResult<Project> {
        let project = Project {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            start_date: data.start_date,
            due_date: data.due_date,
            created_at: Utc::now(),
        };
        self.tables()?.projects.push(project.clone());
        Ok(project)
    }

    async fn find_project(&mut self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(self.tables()?.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&mut self) -> StoreResult<Vec<Project>> {
        Ok(self.tables()?.projects.clone())
    }

    async fn delete_project(&mut self, id: Uuid) -> StoreResult<bool> {
        let tables = self.tables()?;

        if !tables.projects.iter().any(|p| p.id == id) {
            return Ok(false);
        }

        let doomed: Vec<Uuid> = tables
            .tasks
            .iter()
            .filter(|t| t.project_id == id)
            .map(|t| t.id)
            .collect();
        tables.remove_tasks(&doomed);
        tables.tools.retain(|t| t.project_id != id);
        tables.projects.retain(|p| p.id != id);
        Ok(true)
    }

    async fn create_task(&mut self, data: CreateTask) -> StoreResult<Task> {
        let tables = self.tables()?;

        let task = Task {
            id: Uuid::new_v4(),
            project_id: data.project_id,
            title: data.title,
            description: data.description,
            status: STATUS_PENDING.to_string(),
            start_date: data.start_date,
            due_date: data.due_date,
            assigned_to: data.assigned_to,
            tool_id: data.tool_id,
            due_date_edited: false,
            due_date_change_reason: None,
            created_at: Utc::now(),
        };
        tables.check_task_refs(&task)?;
        tables.tasks.push(task.clone());
        Ok(task)
    }

    async fn find_task(&mut self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self.tables()?.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks_by_project(&mut self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(self
            .tables()?
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn list_tasks_by_tool(&mut self, tool_id: Uuid) -> StoreResult<Vec<Task>> {
        Ok(self
            .tables()?
            .tasks
            .iter()
            .filter(|t| t.tool_id == Some(tool_id))
            .cloned()
            .collect())
    }

    async fn list_tasks_assigned_to(&mut self, user_id: Uuid) -> StoreResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .tables()?
            .tasks
            .iter()
            .filter(|t| t.assigned_to == Some(user_id))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.due_date);
        Ok(tasks)
    }

    async fn save_task(&mut self, task: &Task) -> StoreResult<Option<Task>> {
        let tables = self.tables()?;

        if !tables.tasks.iter().any(|t| t.id == task.id) {
            return Ok(None);
        }
        tables.check_task_refs(task)?;

        Ok(tables.tasks.iter_mut().find(|t| t.id == task.id).map(|stored| {
            stored.title = task.title.clone();
            stored.description = task.description.clone();
            stored.status = task.status.clone();
            stored.start_date = task.start_date;
            stored.due_date = task.due_date;
            stored.assigned_to = task.assigned_to;
            stored.tool_id = task.tool_id;
            stored.due_date_edited = task.due_date_edited;
            stored.due_date_change_reason = task.due_date_change_reason.clone();
            stored.clone()
        }))
    }

    async fn delete_task(&mut self, id: Uuid) -> StoreResult<bool> {
        let tables = self.tables()?;

        if !tables.tasks.iter().any(|t| t.id == id) {
            return Ok(false);
        }
        tables.remove_tasks(&[id]);
        Ok(true)
    }

    async fn create_comment(&mut self, data: CreateComment) -> StoreResult<Comment> {
        let tables = self.tables()?;

        if !tables.tasks.iter().any(|t| t.id == data.task_id) {
            return Err(fk("comments_task_id_fkey"));
        }
        if !tables.user_exists(data.user_id) {
            return Err(fk("comments_user_id_fkey"));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            task_id: data.task_id,
            user_id: data.user_id,
            content: data.content,
            created_at: Utc::now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_comment(&mut self, id: Uuid) -> StoreResult<Option<Comment>> {
        Ok(self.tables()?.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments_by_task(&mut self, task_id: Uuid) -> StoreResult<Vec<Comment>> {
        Ok(self
            .tables()?
            .comments
            .iter()
            .filter(|c| c.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn update_comment_content(
        &mut self,
        id: Uuid,
        content: &str,
    ) -> StoreResult<Option<Comment>> {
        let tables = self.tables()?;

        Ok(tables.comments.iter_mut().find(|c| c.id == id).map(|comment| {
            comment.content = content.to_string();
            comment.clone()
        }))
    }

    async fn delete_comment(&mut self, id: Uuid) -> StoreResult<bool> {
        let tables = self.tables()?;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        Ok(tables.comments.len() < before)
    }

    async fn create_tool(&mut self, data: CreateTool) -> StoreResult<Tool> {
        let tables = self.tables()?;

        if !tables.projects.iter().any(|p| p.id == data.project_id) {
            return Err(fk("tools_project_id_fkey"));
        }

        let tool = Tool {
            id: Uuid::new_v4(),
            project_id: data.project_id,
            name: data.name,
            created_at: Utc::now(),
        };
        tables.tools.push(tool.clone());
        Ok(tool)
    }

    async fn find_tool(&mut self, id: Uuid) -> StoreResult<Option<Tool>> {
        Ok(self.tables()?.tools.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tools_by_project(&mut self, project_id: Uuid) -> StoreResult<Vec<Tool>> {
        Ok(self
            .tables()?
            .tools
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn delete_tool(&mut self, id: Uuid) -> StoreResult<bool> {
        let tables = self.tables()?;

        if !tables.tools.iter().any(|t| t.id == id) {
            return Ok(false);
        }

        for task in tables.tasks.iter_mut().filter(|t| t.tool_id == Some(id)) {
            task.tool_id = None;
        }
        tables.tools.retain(|t| t.id != id);
        Ok(true)
    }

    async fn create_attachment(&mut self, data: CreateAttachment) -> StoreResult<Attachment> {
        let tables = self.tables()?;

        if !tables.tasks.iter().any(|t| t.id == data.task_id) {
            return Err(fk("attachments_task_id_fkey"));
        }

        let attachment = Attachment {
            id: Uuid::new_v4(),
            task_id: data.task_id,
            filename: data.filename,
            content_type: data.content_type,
            data: data.data,
            created_at: Utc::now(),
        };
        tables.attachments.push(attachment.clone());
        Ok(attachment)
    }

    async fn find_attachment(&mut self, id: Uuid) -> StoreResult<Option<Attachment>> {
        Ok(self.tables()?.attachments.iter().find(|a| a.id == id).cloned())
    }

    async fn list_attachments_by_task(
        &mut self,
        task_id: Uuid,
    ) -> StoreResult<Vec<AttachmentInfo>> {
        // rows are kept in insertion order
        Ok(self
            .tables()?
            .attachments
            .iter()
            .rev()
            .filter(|a| a.task_id == task_id)
            .map(Attachment::info)
            .collect())
    }

    async fn commit(&mut self) -> StoreResult<()> {
        let mut guard = self.guard.take().ok_or(StoreError::SessionClosed)?;
        *guard = std::mem::take(&mut self.working);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_user(email: &str) -> CreateUser {
        CreateUser {
            username: "user".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::Member,
        }
    }

    fn new_project() -> CreateProject {
        CreateProject {
            title: "Launch".to_string(),
            description: "Site launch".to_string(),
            start_date: date(2030, 1, 1),
            due_date: date(2030, 1, 31),
        }
    }

    fn new_task(project_id: Uuid) -> CreateTask {
        CreateTask {
            project_id,
            title: "Copy".to_string(),
            description: "Write copy".to_string(),
            start_date: date(2030, 1, 2),
            due_date: date(2030, 1, 5),
            assigned_to: None,
            tool_id: None,
        }
    }

    #[tokio::test]
    async fn test_uncommitted_session_is_discarded() {
        let db = MemoryDatabase::new();

        {
            let mut store = db.begin().await.unwrap();
            store.create_user(new_user("a@example.com")).await.unwrap();
        }

        assert_eq!(db.table_counts().await.users, 0);

        let mut store = db.begin().await.unwrap();
        store.create_user(new_user("a@example.com")).await.unwrap();
        store.commit().await.unwrap();

        assert_eq!(db.table_counts().await.users, 1);
    }

    #[tokio::test]
    async fn test_committed_session_is_closed() {
        let db = MemoryDatabase::new();
        let mut store = db.begin().await.unwrap();
        store.commit().await.unwrap();

        assert!(matches!(store.list_users().await, Err(StoreError::SessionClosed)));
        assert!(matches!(store.commit().await, Err(StoreError::SessionClosed)));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let db = MemoryDatabase::new();
        let mut store = db.begin().await.unwrap();

        store.create_user(new_user("dup@example.com")).await.unwrap();
        let err = store.create_user(new_user("dup@example.com")).await.unwrap_err();

        assert!(matches!(err, StoreError::UniqueViolation(ref c) if c == "users_email_key"));
    }

    #[tokio::test]
    async fn test_task_requires_existing_project() {
        let db = MemoryDatabase::new();
        let mut store = db.begin().await.unwrap();

        let err = store.create_task(new_task(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn test_project_delete_cascades() {
        let db = MemoryDatabase::new();
        let mut store = db.begin().await.unwrap();

        let user = store.create_user(new_user("c@example.com")).await.unwrap();
        let project = store.create_project(new_project()).await.unwrap();
        let tool = store
            .create_tool(CreateTool {
                project_id: project.id,
                name: "Figma".to_string(),
            })
            .await
            .unwrap();
        let task = store.create_task(new_task(project.id)).await.unwrap();
        store
            .create_comment(CreateComment {
                task_id: task.id,
                user_id: user.id,
                content: "Looks good".to_string(),
            })
            .await
            .unwrap();
        store
            .create_attachment(CreateAttachment {
                task_id: task.id,
                filename: "brief.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                data: vec![1, 2, 3],
            })
            .await
            .unwrap();

        assert!(store.delete_project(project.id).await.unwrap());
        assert!(store.find_tool(tool.id).await.unwrap().is_none());
        store.commit().await.unwrap();

        let counts = db.table_counts().await;
        assert_eq!(
            counts,
            TableCounts {
                users: 1,
                ..TableCounts::default()
            }
        );
    }

    #[tokio::test]
    async fn test_user_delete_unassigns_tasks() {
        let db = MemoryDatabase::new();
        let mut store = db.begin().await.unwrap();

        let user = store.create_user(new_user("d@example.com")).await.unwrap();
        let project = store.create_project(new_project()).await.unwrap();
        let task = store
            .create_task(CreateTask {
                assigned_to: Some(user.id),
                ..new_task(project.id)
            })
            .await
            .unwrap();

        assert!(store.delete_user(user.id).await.unwrap());
        assert!(!store.delete_user(user.id).await.unwrap());

        let task = store.find_task(task.id).await.unwrap().unwrap();
        assert_eq!(task.assigned_to, None);
    }

    #[tokio::test]
    async fn test_tool_delete_clears_task_tag() {
        let db = MemoryDatabase::new();
        let mut store = db.begin().await.unwrap();

        let project = store.create_project(new_project()).await.unwrap();
        let tool = store
            .create_tool(CreateTool {
                project_id: project.id,
                name: "Jira".to_string(),
            })
            .await
            .unwrap();
        let task = store
            .create_task(CreateTask {
                tool_id: Some(tool.id),
                ..new_task(project.id)
            })
            .await
            .unwrap();

        assert_eq!(store.list_tasks_by_tool(tool.id).await.unwrap().len(), 1);
        assert!(store.delete_tool(tool.id).await.unwrap());

        let task = store.find_task(task.id).await.unwrap().unwrap();
        assert_eq!(task.tool_id, None);
    }

    #[tokio::test]
    async fn test_attachments_are_listed_newest_first() {
        let db = MemoryDatabase::new();
        let mut store = db.begin().await.unwrap();

        let project = store.create_project(new_project()).await.unwrap();
        let task = store.create_task(new_task(project.id)).await.unwrap();

        for name in ["first.pdf", "second.eml"] {
            store
                .create_attachment(CreateAttachment {
                    task_id: task.id,
                    filename: name.to_string(),
                    content_type: "application/octet-stream".to_string(),
                    data: Vec::new(),
                })
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .list_attachments_by_task(task.id)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.filename)
            .collect();
        assert_eq!(names, vec!["second.eml", "first.pdf"]);
    }
}
