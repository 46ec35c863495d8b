/// Project tool endpoints
///
/// # Endpoints
///
/// - `POST /tool/:project_id/tools` - Add a tool to a project (admin, manager)
/// - `GET /tool/:project_id/tools` - List a project's tools
/// - `DELETE /tool/tools/:tool_id` - Delete a tool (admin, manager)
/// - `GET /tool/:project_id/tools/:tool_id/tasks` - Tasks tagged with a tool

use serde::{Deserialize, Serialize};
use taskboard_shared::models::task::Task;
use taskboard_shared::models::tool::Tool;
use taskboard_shared::services::tools;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::Session,
    error::ApiResult,
    extract::{Json, Path},
};

/// Create tool request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateToolRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Tool delete confirmation, `{"detail": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ToolDeleted {
    pub detail: String,
}

pub async fn create_tool(
    mut session: Session,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateToolRequest>,
) -> ApiResult<Json<Tool>> {
    req.validate()?;

    let (store, actor) = session.parts();
    let tool = tools::create_tool(store, actor, project_id, req.name).await?;
    session.commit().await?;

    Ok(Json(tool))
}

pub async fn list_tools(
    mut session: Session,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Tool>>> {
    let (store, actor) = session.parts();
    Ok(Json(tools::list_tools(store, actor, project_id).await?))
}

/// Deletes a tool; tasks that referenced it keep existing untagged
pub async fn delete_tool(
    mut session: Session,
    Path(tool_id): Path<Uuid>,
) -> ApiResult<Json<ToolDeleted>> {
    let (store, actor) = session.parts();
    tools::delete_tool(store, actor, tool_id).await?;
    session.commit().await?;

    Ok(Json(ToolDeleted {
        detail: "Tool deleted successfully".to_string(),
    }))
}

pub async fn list_tool_tasks(
    mut session: Session,
    Path((project_id, tool_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<Task>>> {
    let (store, actor) = session.parts();
    Ok(Json(
        tools::list_tasks_by_tool(store, actor, project_id, tool_id).await?,
    ))
}
