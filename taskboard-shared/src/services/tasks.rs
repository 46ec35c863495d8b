/// Task lifecycle
///
/// Tasks live inside a project's date window. Creation and every update
/// that moves a date re-check the window; moving the due date after
/// creation flags the task as edited and records why.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use taskboard_shared::services::tasks::{LifecyclePolicy, TaskPatch};
///
/// let patch = TaskPatch {
///     due_date: NaiveDate::from_ymd_opt(2030, 1, 20),
///     due_date_change_reason: Some("Vendor delay".to_string()),
///     ..TaskPatch::default()
/// };
/// assert!(!patch.is_empty());
/// assert!(LifecyclePolicy::default().require_due_date_reason);
/// ```

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use super::schedule::check_task_dates;
use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, Operation};
use crate::models::project::Project;
use crate::models::task::{CreateTask, Task};
use crate::models::user::User;
use crate::store::Store;

/// Message when a due date moves without a reason
pub const REASON_REQUIRED: &str = "A reason is required when changing the due date";

/// Rules applied when tasks change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// Reject due date changes that come without a non-blank reason
    pub require_due_date_reason: bool,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            require_due_date_reason: true,
        }
    }
}

/// Partial update of a task
///
/// `None` leaves a field untouched. For the nullable references,
/// `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<Option<Uuid>>,
    pub tool_id: Option<Option<Uuid>>,

    /// Recorded only when `due_date` actually changes
    pub due_date_change_reason: Option<String>,
}

/// What an applied patch changed beyond plain fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchEffect {
    pub dates_changed: bool,
    pub due_date_changed: bool,
    pub assignee_changed: bool,
    pub tool_changed: bool,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Merges this patch into `task`
    ///
    /// A due date equal to the current one is not a change. When the due
    /// date does change, `due_date_edited` is set and the reason replaces
    /// the previous one.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if the due date changes without a
    /// non-blank reason while `policy` requires one. `task` is left
    /// untouched in that case.
    pub fn apply(self, task: &mut Task, policy: LifecyclePolicy) -> ServiceResult<PatchEffect> {
        let due_date = self.due_date.filter(|due| *due != task.due_date);
        let reason = self
            .due_date_change_reason
            .filter(|r| !r.trim().is_empty());

        if due_date.is_some() && reason.is_none() && policy.require_due_date_reason {
            return Err(ServiceError::Validation(REASON_REQUIRED.to_string()));
        }

        let mut effect = PatchEffect::default();

        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(start) = self.start_date.filter(|s| *s != task.start_date) {
            task.start_date = start;
            effect.dates_changed = true;
        }
        if let Some(due) = due_date {
            task.due_date = due;
            task.due_date_edited = true;
            task.due_date_change_reason = reason;
            effect.dates_changed = true;
            effect.due_date_changed = true;
        }
        if let Some(assignee) = self.assigned_to.filter(|a| *a != task.assigned_to) {
            task.assigned_to = assignee;
            effect.assignee_changed = true;
        }
        if let Some(tool) = self.tool_id.filter(|t| *t != task.tool_id) {
            task.tool_id = tool;
            effect.tool_changed = true;
        }

        Ok(effect)
    }
}

/// Checks that an assignee exists and a tool belongs to `project`
async fn check_references(
    store: &mut dyn Store,
    project: &Project,
    assigned_to: Option<Uuid>,
    tool_id: Option<Uuid>,
) -> ServiceResult<()> {
    if let Some(user_id) = assigned_to {
        if store.find_user(user_id).await?.is_none() {
            return Err(ServiceError::NotFound("User"));
        }
    }

    if let Some(tool_id) = tool_id {
        match store.find_tool(tool_id).await? {
            Some(tool) if tool.project_id == project.id => {}
            _ => return Err(ServiceError::NotFound("Tool")),
        }
    }

    Ok(())
}

/// Creates a task with status `pending`
///
/// # Errors
///
/// - `ServiceError::Forbidden` unless the actor is an admin or manager
/// - `ServiceError::NotFound` if the project, assignee or tool is missing
/// - `ServiceError::InvalidDateRange` if the dates leave the project window
///   or are inverted
pub async fn create_task(
    store: &mut dyn Store,
    actor: &User,
    data: CreateTask,
) -> ServiceResult<Task> {
    authorize(actor, Operation::CreateTask)?;

    let project = store
        .find_project(data.project_id)
        .await?
        .ok_or(ServiceError::NotFound("Project"))?;

    check_task_dates(&project, data.start_date, data.due_date)?;
    check_references(store, &project, data.assigned_to, data.tool_id).await?;

    let task = store.create_task(data).await?;
    info!(actor_id = %actor.id, task_id = %task.id, project_id = %project.id, "Task created");
    Ok(task)
}

/// Tasks of a project; empty for an unknown project
pub async fn list_tasks_by_project(
    store: &mut dyn Store,
    actor: &User,
    project_id: Uuid,
) -> ServiceResult<Vec<Task>> {
    authorize(actor, Operation::ListTasks)?;
    Ok(store.list_tasks_by_project(project_id).await?)
}

/// Applies `patch` to a task and returns the updated task
///
/// # Errors
///
/// - `ServiceError::NotFound` if the task, or a newly referenced user or
///   tool, is missing
/// - `ServiceError::Validation` if the due date moves without a required
///   reason
/// - `ServiceError::InvalidDateRange` if the resulting dates break the
///   project window
pub async fn update_task(
    store: &mut dyn Store,
    actor: &User,
    task_id: Uuid,
    patch: TaskPatch,
    policy: LifecyclePolicy,
) -> ServiceResult<Task> {
    authorize(actor, Operation::UpdateTask)?;

    let mut task = store
        .find_task(task_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;

    let effect = patch.apply(&mut task, policy)?;

    if effect.dates_changed || effect.assignee_changed || effect.tool_changed {
        let project = store
            .find_project(task.project_id)
            .await?
            .ok_or(ServiceError::NotFound("Project"))?;

        if effect.dates_changed {
            check_task_dates(&project, task.start_date, task.due_date)?;
        }
        check_references(
            store,
            &project,
            task.assigned_to.filter(|_| effect.assignee_changed),
            task.tool_id.filter(|_| effect.tool_changed),
        )
        .await?;
    }

    if effect.due_date_changed {
        debug!(
            task_id = %task.id,
            due_date = %task.due_date,
            reason = ?task.due_date_change_reason,
            "Task due date moved"
        );
    }

    let task = store
        .save_task(&task)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;

    info!(actor_id = %actor.id, task_id = %task.id, "Task updated");
    Ok(task)
}

/// Deletes a task with its comments and attachments, returning the removed task
pub async fn delete_task(store: &mut dyn Store, actor: &User, task_id: Uuid) -> ServiceResult<Task> {
    authorize(actor, Operation::DeleteTask)?;

    let task = store
        .find_task(task_id)
        .await?
        .ok_or(ServiceError::NotFound("Task"))?;

    store.delete_task(task_id).await?;
    info!(actor_id = %actor.id, task_id = %task_id, "Task deleted");
    Ok(task)
}
