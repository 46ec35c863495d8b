//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An in-memory database with the bootstrap admin already created
//! - The full router wired to it
//! - Helpers to register users with a role and obtain their tokens
//! - Request helpers returning status and parsed JSON

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use taskboard_shared::services::bootstrap::{ensure_admin, AdminConfig};
use taskboard_shared::services::tasks::LifecyclePolicy;
use taskboard_shared::store::memory::MemoryDatabase;
use tower::ServiceExt;

pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const PASSWORD: &str = "LongEnough1!";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "Adm1n!Password";

const BOUNDARY: &str = "taskboard-test-boundary";

/// A logged-in account
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub token: String,
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: Arc<MemoryDatabase>,
    pub app: Router,
    pub admin: TestUser,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:3000".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: SECRET.to_string(),
            expiry_minutes: 30,
        },
        admin: Some(AdminConfig {
            username: "admin".to_string(),
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        }),
        lifecycle: LifecyclePolicy::default(),
    }
}

/// A date `days` from today
pub fn in_days(days: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(days)
}

impl TestContext {
    /// Creates a fresh in-memory app with the admin bootstrapped and logged in
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let db = Arc::new(MemoryDatabase::new());
        if let Some(admin) = &config.admin {
            ensure_admin(db.as_ref(), admin).await.unwrap();
        }

        let app = build_router(AppState::new(db.clone(), config));
        let mut ctx = TestContext {
            db,
            app,
            admin: TestUser {
                id: String::new(),
                token: String::new(),
            },
        };

        ctx.admin = ctx.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        ctx
    }

    /// Sends a request and returns the status with the JSON body (`Null` when empty)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        match body {
            Some(body) => {
                self.send_raw(method, uri, token, "application/json", body.to_string().into_bytes())
                    .await
            }
            None => {
                let mut builder = Request::builder().method(method).uri(uri);
                if let Some(token) = token {
                    builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
                }
                self.dispatch(builder.body(Body::empty()).unwrap()).await
            }
        }
    }

    /// Sends `body` verbatim with the given content type
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: &str,
        body: Vec<u8>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.dispatch(builder.body(Body::from(body)).unwrap()).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Uploads `data` as the multipart field `file`
    pub async fn upload(
        &self,
        task_id: &str,
        token: &str,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> (StatusCode, Value) {
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: {c}\r\n\r\n",
            b = BOUNDARY,
            f = filename,
            c = content_type
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        self.send_raw(
            Method::POST,
            &format!("/project/tasks/{}/attachments", task_id),
            Some(token),
            &format!("multipart/form-data; boundary={}", BOUNDARY),
            body,
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestUser {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        let token = body["access_token"].as_str().unwrap().to_string();

        let (_, users) = self.get("/auth/get-users", &token).await;
        let id = users
            .as_array()
            .and_then(|users| users.iter().find(|u| u["email"] == email))
            .map(|u| u["id"].as_str().unwrap().to_string())
            .unwrap_or_default();

        TestUser { id, token }
    }

    /// Registers `name`, gives it `role` through the admin, and logs it in
    pub async fn user(&self, name: &str, role: &str) -> TestUser {
        let email = format!("{}@example.com", name);
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({ "username": name, "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {}", body);
        let id = body["id"].as_str().unwrap().to_string();

        if role != "member" {
            let (status, body) = self
                .put(
                    &format!("/auth/change-role/{}", id),
                    &self.admin.token,
                    json!({ "role": role }),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "change-role failed: {}", body);
        }

        let login = self.login(&email, PASSWORD).await;
        TestUser {
            id,
            token: login.token,
        }
    }

    /// Creates a project running from tomorrow for a month
    pub async fn project(&self, token: &str) -> String {
        let (status, body) = self
            .post(
                "/project/create-projects",
                token,
                json!({
                    "title": "Launch",
                    "description": "Go live",
                    "start_date": in_days(1),
                    "due_date": in_days(30),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create project failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Creates a task in `project_id` due in ten days
    pub async fn task(&self, token: &str, project_id: &str, assignee: Option<&str>) -> Value {
        let (status, body) = self
            .post(
                "/project/create-tasks",
                token,
                json!({
                    "project_id": project_id,
                    "title": "Write release notes",
                    "description": "",
                    "start_date": in_days(2),
                    "due_date": in_days(10),
                    "assigned_to": assignee,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create task failed: {}", body);
        body
    }
}
