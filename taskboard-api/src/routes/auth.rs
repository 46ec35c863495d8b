/// Authentication and user administration endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a new member account
/// - `POST /auth/login` - Exchange credentials for a bearer token
/// - `PUT /auth/change-role/:user_id` - Change a user's role (admin)
/// - `GET /auth/get-users` - List all users (admin)
/// - `DELETE /auth/users/:user_id` - Delete a user (admin)

use axum::extract::State;
use serde::{Deserialize, Serialize};
use taskboard_shared::models::user::User;
use taskboard_shared::services::users::{self, Registration};
use uuid::Uuid;
use validator::Validate;

use super::MessageResponse;
use crate::{
    app::{AppState, Session},
    error::ApiResult,
    extract::{Json, Path},
};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Checked against the strength policy by the service
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,

    /// Always `bearer`
    pub token_type: String,
}

/// Change role request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangeRoleRequest {
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "username": "mia",
///   "email": "mia@example.com",
///   "password": "LongEnough1!"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Weak password or email already registered
/// - `422 Unprocessable Entity`: Malformed body
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;

    let mut store = state.begin().await?;
    let user = users::register(
        store.as_mut(),
        Registration {
            username: req.username,
            email: req.email,
            password: req.password,
        },
    )
    .await?;
    store.commit().await?;

    Ok(Json(user))
}

/// Log in
///
/// Unknown email and wrong password fail the same way (401).
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let mut store = state.begin().await?;
    let access_token = users::login(
        store.as_mut(),
        &req.email,
        &req.password,
        state.jwt_secret(),
        state.config.token_ttl(),
    )
    .await?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

pub async fn change_role(
    mut session: Session,
    Path(user_id): Path<Uuid>,
    Json(req): Json<ChangeRoleRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;

    let (store, actor) = session.parts();
    let user = users::change_role(store, actor, user_id, &req.role).await?;
    session.commit().await?;

    Ok(Json(user))
}

pub async fn list_users(mut session: Session) -> ApiResult<Json<Vec<User>>> {
    let (store, actor) = session.parts();
    Ok(Json(users::list_users(store, actor).await?))
}

pub async fn delete_user(
    mut session: Session,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let (store, actor) = session.parts();
    let deleted = users::delete_user(store, actor, user_id).await?;
    session.commit().await?;

    Ok(Json(MessageResponse::new(format!(
        "User '{}' deleted successfully",
        deleted.username
    ))))
}
