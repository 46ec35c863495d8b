/// Task comments
///
/// Any role may comment on a task. Editing a comment is reserved to its
/// author; deleting it is open to the author and to staff.

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{
    authorize, require_comment_author, require_comment_delete, Operation,
};
use crate::models::comment::{Comment, CreateComment};
use crate::models::user::User;
use crate::store::Store;

/// A comment with its author's display name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthoredComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: String,
}

/// Adds a comment by `actor` to a task
pub async fn create_comment(
    store: &mut dyn Store,
    actor: &User,
    task_id: Uuid,
    content: String,
) -> ServiceResult<Comment> {
    authorize(actor, Operation::CreateComment)?;

    if store.find_task(task_id).await?.is_none() {
        return Err(ServiceError::NotFound("Task"));
    }

    let comment = store
        .create_comment(CreateComment {
            task_id,
            user_id: actor.id,
            content,
        })
        .await?;

    info!(actor_id = %actor.id, task_id = %task_id, comment_id = %comment.id, "Comment created");
    Ok(comment)
}

/// Comments of a task, oldest first; empty for an unknown task
pub async fn list_comments(
    store: &mut dyn Store,
    actor: &User,
    task_id: Uuid,
) -> ServiceResult<Vec<AuthoredComment>> {
    authorize(actor, Operation::ListComments)?;

    let comments = store.list_comments_by_task(task_id).await?;
    let mut authored = Vec::with_capacity(comments.len());

    for comment in comments {
        let author = store
            .find_user(comment.user_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_default();
        authored.push(AuthoredComment { comment, author });
    }

    Ok(authored)
}

/// Replaces the content of a comment written by `actor`
///
/// # Errors
///
/// - `ServiceError::NotFound` if the comment is missing
/// - `ServiceError::Forbidden` if `actor` is not the author, whatever their role
pub async fn update_comment(
    store: &mut dyn Store,
    actor: &User,
    comment_id: Uuid,
    content: &str,
) -> ServiceResult<Comment> {
    let comment = store
        .find_comment(comment_id)
        .await?
        .ok_or(ServiceError::NotFound("Comment"))?;

    require_comment_author(actor, &comment)?;

    let comment = store
        .update_comment_content(comment_id, content)
        .await?
        .ok_or(ServiceError::NotFound("Comment"))?;

    info!(actor_id = %actor.id, comment_id = %comment_id, "Comment updated");
    Ok(comment)
}

/// Deletes a comment, returning it
///
/// # Errors
///
/// - `ServiceError::NotFound` if the comment is missing
/// - `ServiceError::Forbidden` unless `actor` is the author, an admin or a manager
pub async fn delete_comment(
    store: &mut dyn Store,
    actor: &User,
    comment_id: Uuid,
) -> ServiceResult<Comment> {
    let comment = store
        .find_comment(comment_id)
        .await?
        .ok_or(ServiceError::NotFound("Comment"))?;

    require_comment_delete(actor, &comment)?;

    store.delete_comment(comment_id).await?;
    info!(actor_id = %actor.id, comment_id = %comment_id, "Comment deleted");
    Ok(comment)
}
