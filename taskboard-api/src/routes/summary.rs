/// Workload summary endpoints
///
/// # Endpoints
///
/// - `GET /summary/user-summary?user_id=` - Task counts for the caller, or any user (admin)
/// - `GET /summary/project-summary` - Task counts per project (admin, manager)
/// - `GET /summary/tasks/:status?user_id=` - Tasks of one bucket:
///   `assigned_tasks`, `completed_tasks`, `overdue_tasks` or `due_soon`

use serde::Deserialize;
use taskboard_shared::models::task::Task;
use taskboard_shared::services::summary::{self, ProjectSummary, UserSummary};
use uuid::Uuid;

use super::today;
use crate::{
    app::Session,
    error::ApiResult,
    extract::{Json, Path, Query},
};

/// Optional `user_id` override
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub user_id: Option<Uuid>,
}

pub async fn user_summary(
    mut session: Session,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<UserSummary>> {
    let (store, actor) = session.parts();
    Ok(Json(
        summary::user_summary(store, actor, query.user_id, today()).await?,
    ))
}

pub async fn project_summary(mut session: Session) -> ApiResult<Json<Vec<ProjectSummary>>> {
    let (store, actor) = session.parts();
    Ok(Json(summary::project_summary(store, actor).await?))
}

pub async fn tasks_by_status(
    mut session: Session,
    Path(status): Path<String>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let (store, actor) = session.parts();
    Ok(Json(
        summary::tasks_by_status(store, actor, &status, query.user_id, today()).await?,
    ))
}
