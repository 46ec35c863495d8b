/// Workload summaries
///
/// Counts are computed over the tasks assigned to one user, on calendar
/// dates relative to `today`:
///
/// | Bucket | Rule |
/// |--------|------|
/// | assigned | every assigned task |
/// | completed | status is `completed` |
/// | overdue | not completed and `due_date <= today` |
/// | due soon | not completed and `today < due_date <= today + 2 days` |
///
/// Users read their own numbers. Reading someone else's requires an admin.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, Operation};
use crate::models::task::Task;
use crate::models::user::User;
use crate::store::Store;

/// Task counts for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub user_id: Uuid,
    pub username: String,
    pub assigned_tasks: usize,
    pub completed_tasks: usize,
    pub overdue_tasks: usize,
    pub soon_due_tasks: usize,
}

/// Task counts for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub project_id: Uuid,
    pub project_name: String,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
}

/// Selects one summary bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatusFilter {
    Assigned,
    Completed,
    Overdue,
    DueSoon,
}

impl TaskStatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatusFilter::Assigned => "assigned_tasks",
            TaskStatusFilter::Completed => "completed_tasks",
            TaskStatusFilter::Overdue => "overdue_tasks",
            TaskStatusFilter::DueSoon => "due_soon",
        }
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            TaskStatusFilter::Assigned => true,
            TaskStatusFilter::Completed => task.is_completed(),
            TaskStatusFilter::Overdue => task.is_overdue(today),
            TaskStatusFilter::DueSoon => task.is_due_soon(today),
        }
    }
}

impl FromStr for TaskStatusFilter {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assigned_tasks" => Ok(TaskStatusFilter::Assigned),
            "completed_tasks" => Ok(TaskStatusFilter::Completed),
            "overdue_tasks" => Ok(TaskStatusFilter::Overdue),
            "due_soon" => Ok(TaskStatusFilter::DueSoon),
            _ => Err(ServiceError::Validation("Invalid status filter".to_string())),
        }
    }
}

/// Resolves whose tasks are being read
///
/// Without an override this is `actor`. An override naming anyone requires
/// an admin, and the named user must exist.
async fn target_user(
    store: &mut dyn Store,
    actor: &User,
    user_id: Option<Uuid>,
) -> ServiceResult<User> {
    match user_id {
        None => Ok(actor.clone()),
        Some(id) => {
            authorize(actor, Operation::CrossUserSummary)?;
            store
                .find_user(id)
                .await?
                .ok_or(ServiceError::NotFound("User"))
        }
    }
}

pub async fn user_summary(
    store: &mut dyn Store,
    actor: &User,
    user_id: Option<Uuid>,
    today: NaiveDate,
) -> ServiceResult<UserSummary> {
    authorize(actor, Operation::UserSummary)?;
    let target = target_user(store, actor, user_id).await?;

    let tasks = store.list_tasks_assigned_to(target.id).await?;
    let count = |filter: TaskStatusFilter| tasks.iter().filter(|t| filter.matches(t, today)).count();

    Ok(UserSummary {
        user_id: target.id,
        username: target.username.clone(),
        assigned_tasks: tasks.len(),
        completed_tasks: count(TaskStatusFilter::Completed),
        overdue_tasks: count(TaskStatusFilter::Overdue),
        soon_due_tasks: count(TaskStatusFilter::DueSoon),
    })
}

/// Per-project task counts for every project
pub async fn project_summary(
    store: &mut dyn Store,
    actor: &User,
) -> ServiceResult<Vec<ProjectSummary>> {
    authorize(actor, Operation::ProjectSummary)?;

    let projects = store.list_projects().await?;
    let mut summaries = Vec::with_capacity(projects.len());

    for project in projects {
        let tasks = store.list_tasks_by_project(project.id).await?;
        let completed = tasks.iter().filter(|t| t.is_completed()).count();

        summaries.push(ProjectSummary {
            project_id: project.id,
            project_name: project.title,
            total_tasks: tasks.len(),
            completed_tasks: completed,
            pending_tasks: tasks.len() - completed,
        });
    }

    Ok(summaries)
}

/// Tasks of one summary bucket
///
/// `status` is the raw bucket name. The override is checked before the
/// bucket name is parsed.
pub async fn tasks_by_status(
    store: &mut dyn Store,
    actor: &User,
    status: &str,
    user_id: Option<Uuid>,
    today: NaiveDate,
) -> ServiceResult<Vec<Task>> {
    authorize(actor, Operation::TasksByStatus)?;
    let target = target_user(store, actor, user_id).await?;
    let filter: TaskStatusFilter = status.parse()?;

    let tasks = store.list_tasks_assigned_to(target.id).await?;
    Ok(tasks
        .into_iter()
        .filter(|t| filter.matches(t, today))
        .collect())
}
