/// Task comment endpoints
///
/// # Endpoints
///
/// - `POST /comment/task/:task_id` - Comment on a task
/// - `GET /comment/task/:task_id` - List a task's comments, oldest first
/// - `PUT /comment/comments/:comment_id` - Edit a comment (author only)
/// - `DELETE /comment/:comment_id` - Delete a comment (author, admin, manager)

use axum::http::StatusCode;
use serde::Deserialize;
use taskboard_shared::models::comment::Comment;
use taskboard_shared::services::comments::{self, AuthoredComment};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::Session,
    error::ApiResult,
    extract::{Json, Path},
};

/// Comment body, for both create and edit
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 5000, message = "Content must be 1-5000 characters"))]
    pub content: String,
}

pub async fn create_comment(
    mut session: Session,
    Path(task_id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<Json<Comment>> {
    req.validate()?;

    let (store, actor) = session.parts();
    let comment = comments::create_comment(store, actor, task_id, req.content).await?;
    session.commit().await?;

    Ok(Json(comment))
}

pub async fn list_comments(
    mut session: Session,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<AuthoredComment>>> {
    let (store, actor) = session.parts();
    Ok(Json(comments::list_comments(store, actor, task_id).await?))
}

pub async fn update_comment(
    mut session: Session,
    Path(comment_id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<Json<Comment>> {
    req.validate()?;

    let (store, actor) = session.parts();
    let comment = comments::update_comment(store, actor, comment_id, &req.content).await?;
    session.commit().await?;

    Ok(Json(comment))
}

/// Answers 204 with no body
pub async fn delete_comment(
    mut session: Session,
    Path(comment_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let (store, actor) = session.parts();
    comments::delete_comment(store, actor, comment_id).await?;
    session.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
