/// Project tools
///
/// A tool is a named tag owned by a project. Tasks of the same project may
/// reference it; deleting the tool clears those references.

use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, Operation};
use crate::models::task::Task;
use crate::models::tool::{CreateTool, Tool};
use crate::models::user::User;
use crate::store::Store;

/// Adds a tool to a project
///
/// The project is looked up before the actor's role is checked.
pub async fn create_tool(
    store: &mut dyn Store,
    actor: &User,
    project_id: Uuid,
    name: String,
) -> ServiceResult<Tool> {
    if store.find_project(project_id).await?.is_none() {
        return Err(ServiceError::NotFound("Project"));
    }

    authorize(actor, Operation::CreateTool)?;

    let tool = store.create_tool(CreateTool { project_id, name }).await?;
    info!(actor_id = %actor.id, project_id = %project_id, tool_id = %tool.id, "Tool created");
    Ok(tool)
}

/// Tools of a project; empty for an unknown project
pub async fn list_tools(
    store: &mut dyn Store,
    actor: &User,
    project_id: Uuid,
) -> ServiceResult<Vec<Tool>> {
    authorize(actor, Operation::ListTools)?;
    Ok(store.list_tools_by_project(project_id).await?)
}

/// Deletes a tool, returning it
///
/// Checks run in order: tool exists, its project exists, actor is staff.
pub async fn delete_tool(store: &mut dyn Store, actor: &User, tool_id: Uuid) -> ServiceResult<Tool> {
    let tool = store
        .find_tool(tool_id)
        .await?
        .ok_or(ServiceError::NotFound("Tool"))?;

    if store.find_project(tool.project_id).await?.is_none() {
        return Err(ServiceError::NotFound("Project"));
    }

    authorize(actor, Operation::DeleteTool)?;

    store.delete_tool(tool_id).await?;
    info!(actor_id = %actor.id, tool_id = %tool_id, "Tool deleted");
    Ok(tool)
}

/// Tasks tagged with a tool of the given project
///
/// # Errors
///
/// Returns `ServiceError::NotFound` if the project is missing or the tool
/// does not belong to it
pub async fn list_tasks_by_tool(
    store: &mut dyn Store,
    actor: &User,
    project_id: Uuid,
    tool_id: Uuid,
) -> ServiceResult<Vec<Task>> {
    authorize(actor, Operation::ListToolTasks)?;

    if store.find_project(project_id).await?.is_none() {
        return Err(ServiceError::NotFound("Project"));
    }

    match store.find_tool(tool_id).await? {
        Some(tool) if tool.project_id == project_id => {}
        _ => return Err(ServiceError::NotFound("Tool")),
    }

    Ok(store.list_tasks_by_tool(tool_id).await?)
}
