/// Project lifecycle
///
/// A project is created with a date window that starts no earlier than
/// today. Deleting a project removes its tools and tasks, and the tasks'
/// comments and attachments with them.

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use super::schedule::check_project_dates;
use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, Operation};
use crate::models::project::{CreateProject, Project};
use crate::models::user::User;
use crate::store::Store;

/// Creates a project
///
/// # Errors
///
/// - `ServiceError::Forbidden` unless the actor is an admin or manager
/// - `ServiceError::InvalidDateRange` if the window starts or ends before
///   `today` or is inverted
pub async fn create_project(
    store: &mut dyn Store,
    actor: &User,
    data: CreateProject,
    today: NaiveDate,
) -> ServiceResult<Project> {
    authorize(actor, Operation::CreateProject)?;
    check_project_dates(data.start_date, data.due_date, today)?;

    let project = store.create_project(data).await?;
    info!(actor_id = %actor.id, project_id = %project.id, "Project created");
    Ok(project)
}

pub async fn list_projects(store: &mut dyn Store, actor: &User) -> ServiceResult<Vec<Project>> {
    authorize(actor, Operation::ListProjects)?;
    Ok(store.list_projects().await?)
}

/// Deletes a project and everything it owns, returning the removed project
pub async fn delete_project(
    store: &mut dyn Store,
    actor: &User,
    project_id: Uuid,
) -> ServiceResult<Project> {
    authorize(actor, Operation::DeleteProject)?;

    let project = store
        .find_project(project_id)
        .await?
        .ok_or(ServiceError::NotFound("Project"))?;

    store.delete_project(project_id).await?;
    info!(actor_id = %actor.id, project_id = %project_id, "Project deleted");
    Ok(project)
}
