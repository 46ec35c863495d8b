/// Project, task and attachment endpoints
///
/// # Endpoints
///
/// - `POST /project/create-projects` - Create a project (admin, manager)
/// - `GET /project/get-projects` - List projects
/// - `DELETE /project/delete-project/:project_id` - Delete a project and everything in it
/// - `POST /project/create-tasks` - Create a task (admin, manager)
/// - `GET /project/:project_id/tasks` - List a project's tasks
/// - `PUT /project/update-task/:task_id` - Partially update a task
/// - `DELETE /project/delete-task/:task_id` - Delete a task (admin, manager)
/// - `POST /project/tasks/:task_id/attachments` - Upload a `.eml` or `.pdf` file
/// - `GET /project/tasks/:task_id/attachments` - List attachment metadata
/// - `GET /project/attachments/download/:attachment_id` - Download an attachment

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use taskboard_shared::models::attachment::AttachmentInfo;
use taskboard_shared::models::project::{CreateProject, Project};
use taskboard_shared::models::task::{CreateTask, Task};
use taskboard_shared::services::attachments::{self, Upload, DEFAULT_CONTENT_TYPE};
use taskboard_shared::services::{projects, tasks};
use uuid::Uuid;
use validator::Validate;

use super::{today, MessageResponse};
use crate::{
    app::{AppState, Session},
    error::{ApiError, ApiResult, ValidationErrorDetail},
    extract::{Json, Path},
};

/// Largest accepted upload request body
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    pub project_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub assigned_to: Option<Uuid>,
    pub tool_id: Option<Uuid>,
}

/// Partial task update
///
/// Absent fields are left alone. `assigned_to` and `tool_id` distinguish
/// an absent field from an explicit `null`, which clears the reference.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "Status cannot be empty"))]
    pub status: Option<String>,

    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "present")]
    pub assigned_to: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "present")]
    pub tool_id: Option<Option<Uuid>>,

    pub due_date_change_reason: Option<String>,
}

/// Marks a field that appeared in the body, even as `null`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<UpdateTaskRequest> for tasks::TaskPatch {
    fn from(req: UpdateTaskRequest) -> Self {
        tasks::TaskPatch {
            title: req.title,
            description: req.description,
            status: req.status,
            start_date: req.start_date,
            due_date: req.due_date,
            assigned_to: req.assigned_to,
            tool_id: req.tool_id,
            due_date_change_reason: req.due_date_change_reason,
        }
    }
}

pub async fn create_project(
    mut session: Session,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    let (store, actor) = session.parts();
    let project = projects::create_project(
        store,
        actor,
        CreateProject {
            title: req.title,
            description: req.description,
            start_date: req.start_date,
            due_date: req.due_date,
        },
        today(),
    )
    .await?;
    session.commit().await?;

    Ok(Json(project))
}

pub async fn list_projects(mut session: Session) -> ApiResult<Json<Vec<Project>>> {
    let (store, actor) = session.parts();
    Ok(Json(projects::list_projects(store, actor).await?))
}

/// Deletes a project with its tasks, tools, comments and attachments
pub async fn delete_project(
    mut session: Session,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let (store, actor) = session.parts();
    projects::delete_project(store, actor, project_id).await?;
    session.commit().await?;

    Ok(Json(MessageResponse::new("Project has been deleted successfully")))
}

pub async fn create_task(
    mut session: Session,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let (store, actor) = session.parts();
    let task = tasks::create_task(
        store,
        actor,
        CreateTask {
            project_id: req.project_id,
            title: req.title,
            description: req.description,
            start_date: req.start_date,
            due_date: req.due_date,
            assigned_to: req.assigned_to,
            tool_id: req.tool_id,
        },
    )
    .await?;
    session.commit().await?;

    Ok(Json(task))
}

pub async fn list_tasks(
    mut session: Session,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    let (store, actor) = session.parts();
    Ok(Json(tasks::list_tasks_by_project(store, actor, project_id).await?))
}

/// Applies a partial update
///
/// Moving the due date records `due_date_change_reason`; whether the
/// reason is mandatory follows the configured lifecycle policy.
pub async fn update_task(
    mut session: Session,
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let (store, actor) = session.parts();
    let task = tasks::update_task(store, actor, task_id, req.into(), state.config.lifecycle).await?;
    session.commit().await?;

    Ok(Json(task))
}

pub async fn delete_task(
    mut session: Session,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let (store, actor) = session.parts();
    tasks::delete_task(store, actor, task_id).await?;
    session.commit().await?;

    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

/// Stores the multipart field `file` on a task
///
/// Bodies over [`MAX_UPLOAD_BYTES`] are refused with 413.
pub async fn upload_attachment(
    mut session: Session,
    Path(task_id): Path<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<AttachmentInfo>> {
    let mut multipart = multipart?;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;

        upload = Some(Upload {
            filename,
            content_type,
            data: data.to_vec(),
        });
        break;
    }

    let upload = upload.ok_or_else(|| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "file".to_string(),
            message: "File is required".to_string(),
        }])
    })?;

    let (store, actor) = session.parts();
    let info = attachments::upload_attachment(store, actor, task_id, upload).await?;
    session.commit().await?;

    Ok(Json(info))
}

/// Newest first, without payloads
pub async fn list_attachments(
    mut session: Session,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<AttachmentInfo>>> {
    let (store, actor) = session.parts();
    Ok(Json(attachments::list_attachments(store, actor, task_id).await?))
}

/// Streams the stored bytes back with their declared content type
pub async fn download_attachment(
    mut session: Session,
    Path(attachment_id): Path<Uuid>,
) -> ApiResult<Response> {
    let (store, actor) = session.parts();
    let attachment = attachments::download_attachment(store, actor, attachment_id).await?;

    let content_type = HeaderValue::from_str(&attachment.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    let disposition = HeaderValue::from_str(&content_disposition(&attachment.filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Bytes::from(attachment.data),
    )
        .into_response())
}

/// `attachment; filename="..."` with anything outside printable ASCII
/// and quotes replaced
fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}
