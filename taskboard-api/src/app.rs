/// Application state and router builder
///
/// This module defines the shared application state, the per-request
/// [`Session`] extractor, and the function that assembles the Axum router
/// with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskboard_shared::store::postgres::PgDatabase;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..DatabaseConfig::default()
/// })
/// .await?;
/// let state = AppState::new(Arc::new(PgDatabase::new(pool)), config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use taskboard_shared::auth::jwt::Claims;
use taskboard_shared::auth::middleware::{authenticate, resolve_claims, AuthError};
use taskboard_shared::models::user::User;
use taskboard_shared::store::{Database, Store};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend; every request opens one session on it
    pub db: Arc<dyn Database>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: Arc<dyn Database>, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Opens a store session that no user is attached to
    pub async fn begin(&self) -> Result<Box<dyn Store>, ApiError> {
        Ok(self.db.begin().await?)
    }
}

/// An authenticated request's store session
///
/// Requires the claims inserted by [`jwt_auth_layer`]. The user is loaded
/// inside the session, so a token whose account was deleted is rejected.
/// Dropping the session without [`Session::commit`] discards its writes.
pub struct Session {
    pub store: Box<dyn Store>,
    pub user: User,
}

impl Session {
    /// Borrows the store and the acting user at the same time
    pub fn parts(&mut self) -> (&mut dyn Store, &User) {
        (self.store.as_mut(), &self.user)
    }

    pub async fn commit(mut self) -> Result<(), ApiError> {
        Ok(self.store.commit().await?)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or(AuthError::MissingCredentials)?;

        let mut store = state.db.begin().await?;
        let user = resolve_claims(store.as_mut(), &claims).await?;

        Ok(Session { store, user })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// ├── /auth/
/// │   ├── POST   /register             # public
/// │   ├── POST   /login                # public
/// │   ├── PUT    /change-role/:user_id
/// │   ├── GET    /get-users
/// │   └── DELETE /users/:user_id
/// ├── /project/
/// │   ├── POST   /create-projects
/// │   ├── GET    /get-projects
/// │   ├── DELETE /delete-project/:project_id
/// │   ├── POST   /create-tasks
/// │   ├── GET    /:project_id/tasks
/// │   ├── PUT    /update-task/:task_id
/// │   ├── DELETE /delete-task/:task_id
/// │   ├── POST   /tasks/:task_id/attachments
/// │   ├── GET    /tasks/:task_id/attachments
/// │   └── GET    /attachments/download/:attachment_id
/// ├── /comment/
/// │   ├── POST   /task/:task_id
/// │   ├── GET    /task/:task_id
/// │   ├── PUT    /comments/:comment_id
/// │   └── DELETE /:comment_id
/// ├── /summary/
/// │   ├── GET    /user-summary
/// │   ├── GET    /project-summary
/// │   └── GET    /tasks/:status
/// └── /tool/
///     ├── POST   /:project_id/tools
///     ├── GET    /:project_id/tools
///     ├── DELETE /tools/:tool_id
///     └── GET    /:project_id/tools/:tool_id/tasks
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (everything except health, register and login)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth_layer = axum::middleware::from_fn_with_state(state.clone(), jwt_auth_layer);

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let user_routes = Router::new()
        .route("/change-role/:user_id", put(routes::auth::change_role))
        .route("/get-users", get(routes::auth::list_users))
        .route("/users/:user_id", delete(routes::auth::delete_user))
        .route_layer(auth_layer.clone());

    let project_routes = Router::new()
        .route("/create-projects", post(routes::projects::create_project))
        .route("/get-projects", get(routes::projects::list_projects))
        .route("/delete-project/:project_id", delete(routes::projects::delete_project))
        .route("/create-tasks", post(routes::projects::create_task))
        .route("/:project_id/tasks", get(routes::projects::list_tasks))
        .route("/update-task/:task_id", put(routes::projects::update_task))
        .route("/delete-task/:task_id", delete(routes::projects::delete_task))
        .route(
            "/tasks/:task_id/attachments",
            post(routes::projects::upload_attachment)
                .layer(DefaultBodyLimit::max(routes::projects::MAX_UPLOAD_BYTES))
                .get(routes::projects::list_attachments),
        )
        .route(
            "/attachments/download/:attachment_id",
            get(routes::projects::download_attachment),
        )
        .route_layer(auth_layer.clone());

    let comment_routes = Router::new()
        .route(
            "/task/:task_id",
            post(routes::comments::create_comment).get(routes::comments::list_comments),
        )
        .route("/comments/:comment_id", put(routes::comments::update_comment))
        .route("/:comment_id", delete(routes::comments::delete_comment))
        .route_layer(auth_layer.clone());

    let summary_routes = Router::new()
        .route("/user-summary", get(routes::summary::user_summary))
        .route("/project-summary", get(routes::summary::project_summary))
        .route("/tasks/:status", get(routes::summary::tasks_by_status))
        .route_layer(auth_layer.clone());

    let tool_routes = Router::new()
        .route(
            "/:project_id/tools",
            post(routes::tools::create_tool).get(routes::tools::list_tools),
        )
        .route("/tools/:tool_id", delete(routes::tools::delete_tool))
        .route("/:project_id/tools/:tool_id/tasks", get(routes::tools::list_tool_tasks))
        .route_layer(auth_layer);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .merge(health_routes)
        .nest("/auth", public_auth_routes.merge(user_routes))
        .nest("/project", project_routes)
        .nest("/comment", comment_routes)
        .nest("/summary", summary_routes)
        .nest("/tool", tool_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the bearer token and injects its [`Claims`] into request
/// extensions. Resolving the claims to a user happens in [`Session`].
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = authenticate(req.headers(), state.jwt_secret())?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
