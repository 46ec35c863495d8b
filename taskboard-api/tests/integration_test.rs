/// Integration tests for the Taskboard API
///
/// These tests drive the full router over the in-memory store:
/// - Authentication and registration
/// - Role checks on every resource
/// - Project/task lifecycle with date rules
/// - Comments, tools and attachments
/// - Workload summaries

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{in_days, test_config, TestContext, PASSWORD};
use serde_json::json;
use taskboard_api::routes::projects::MAX_UPLOAD_BYTES;
use taskboard_shared::store::memory::TableCounts;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = TestContext::new().await;

    let request = Request::builder()
        .uri("/project/get-projects")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert_eq!(response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");

    let (status, body) = ctx.get("/project/get-projects", "not-a-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Could not validate credentials");
}

#[tokio::test]
async fn test_register_rules() {
    let ctx = TestContext::new().await;
    let register = |email: &str, password: &str| {
        json!({ "username": "mia", "email": email, "password": password })
    };

    let (status, body) = ctx
        .send(Method::POST, "/auth/register", None, Some(register("mia@example.com", "Short1!")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password must be at least 8 characters long");

    let (status, body) = ctx
        .send(Method::POST, "/auth/register", None, Some(register("mia@example.com", PASSWORD)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "member");
    assert!(body.get("password_hash").is_none());

    let (status, body) = ctx
        .send(Method::POST, "/auth/register", None, Some(register("mia@example.com", PASSWORD)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already exists");

    let (status, body) = ctx
        .send(Method::POST, "/auth/register", None, Some(register("not-an-email", PASSWORD)))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "email");
}

#[tokio::test]
async fn test_login_failures_are_generic() {
    let ctx = TestContext::new().await;
    ctx.user("mia", "member").await;

    for (email, password) in [("mia@example.com", "WrongPass1!"), ("nobody@example.com", PASSWORD)] {
        let (status, body) = ctx
            .send(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Wrong email or Password");
    }

    let (status, body) = ctx
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "mia@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
}

#[tokio::test]
async fn test_user_administration() {
    let ctx = TestContext::new().await;
    let manager = ctx.user("max", "manager").await;
    let member = ctx.user("mia", "member").await;

    let (status, users) = ctx.get("/auth/get-users", &manager.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 3);

    let (status, _) = ctx.get("/auth/get-users", &member.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .put(
            &format!("/auth/change-role/{}", member.id),
            &ctx.admin.token,
            json!({ "role": "owner" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid role");

    let (status, body) = ctx
        .delete(&format!("/auth/users/{}", member.id), &manager.token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");

    let (status, body) = ctx
        .delete(&format!("/auth/users/{}", member.id), &ctx.admin.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User 'mia' deleted successfully");

    // the deleted user's token no longer resolves
    let (status, _) = ctx.get("/project/get-projects", &member.token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_project_creation_rules() {
    let ctx = TestContext::new().await;
    let manager = ctx.user("max", "manager").await;
    let member = ctx.user("mia", "member").await;

    let body = json!({
        "title": "Launch",
        "description": "",
        "start_date": in_days(1),
        "due_date": in_days(30),
    });

    let (status, _) = ctx.post("/project/create-projects", &member.token, body.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, project) = ctx.post("/project/create-projects", &manager.token, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(project["title"], "Launch");

    let (status, body) = ctx
        .post(
            "/project/create-projects",
            &manager.token,
            json!({
                "title": "Retro",
                "description": "",
                "start_date": in_days(-1),
                "due_date": in_days(30),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("start date"));

    let (status, projects) = ctx.get("/project/get-projects", &member.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(projects.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_task_lifecycle() {
    let ctx = TestContext::new().await;
    let manager = ctx.user("max", "manager").await;
    let member = ctx.user("mia", "member").await;
    let project_id = ctx.project(&manager.token).await;

    let (status, _) = ctx
        .post(
            "/project/create-tasks",
            &manager.token,
            json!({
                "project_id": project_id,
                "title": "Backwards",
                "start_date": in_days(10),
                "due_date": in_days(5),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let task = ctx.task(&manager.token, &project_id, Some(member.id.as_str())).await;
    let task_id = task["id"].as_str().unwrap();
    assert_eq!(task["status"], "pending");
    assert_eq!(task["due_date_edited"], false);

    let (status, tasks) = ctx
        .get(&format!("/project/{}/tasks", project_id), &member.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks.as_array().unwrap().len(), 1);

    let update_uri = format!("/project/update-task/{}", task_id);

    let (status, body) = ctx
        .put(&update_uri, &member.token, json!({ "due_date": in_days(12) }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "A reason is required when changing the due date");

    let (status, updated) = ctx
        .put(
            &update_uri,
            &member.token,
            json!({
                "due_date": in_days(12),
                "due_date_change_reason": "Waiting on legal",
                "status": "completed",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["due_date_edited"], true);
    assert_eq!(updated["due_date_change_reason"], "Waiting on legal");
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["title"], "Write release notes");

    let (status, updated) = ctx
        .put(&update_uri, &member.token, json!({ "assigned_to": null }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["assigned_to"].is_null());

    let (status, _) = ctx
        .delete(&format!("/project/delete-task/{}", task_id), &member.token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .delete(&format!("/project/delete-task/{}", task_id), &manager.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task deleted successfully");

    let (status, body) = ctx.put(&update_uri, &member.token, json!({ "title": "Gone" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");
}

#[tokio::test]
async fn test_due_date_reason_can_be_optional() {
    let mut config = test_config();
    config.lifecycle.require_due_date_reason = false;
    let ctx = TestContext::with_config(config).await;
    let manager = ctx.user("max", "manager").await;
    let project_id = ctx.project(&manager.token).await;
    let task = ctx.task(&manager.token, &project_id, None).await;

    let (status, updated) = ctx
        .put(
            &format!("/project/update-task/{}", task["id"].as_str().unwrap()),
            &manager.token,
            json!({ "due_date": in_days(12) }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["due_date_edited"], true);
    assert!(updated["due_date_change_reason"].is_null());
}

#[tokio::test]
async fn test_comments() {
    let ctx = TestContext::new().await;
    let manager = ctx.user("max", "manager").await;
    let author = ctx.user("mia", "member").await;
    let stranger = ctx.user("olly", "member").await;
    let project_id = ctx.project(&manager.token).await;
    let task = ctx.task(&manager.token, &project_id, None).await;
    let task_id = task["id"].as_str().unwrap();

    let (status, comment) = ctx
        .post(
            &format!("/comment/task/{}", task_id),
            &author.token,
            json!({ "content": "Looks good" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let comment_id = comment["id"].as_str().unwrap();

    let (status, comments) = ctx
        .get(&format!("/comment/task/{}", task_id), &stranger.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comments[0]["content"], "Looks good");
    assert_eq!(comments[0]["author"], "mia");

    let (status, body) = ctx
        .put(
            &format!("/comment/comments/{}", comment_id),
            &manager.token,
            json!({ "content": "Edited" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not allowed to edit this comment");

    let (status, edited) = ctx
        .put(
            &format!("/comment/comments/{}", comment_id),
            &author.token,
            json!({ "content": "Edited" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["content"], "Edited");

    let (status, body) = ctx
        .delete(&format!("/comment/{}", comment_id), &stranger.token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You do not have permission to delete this comment");

    let (status, body) = ctx
        .delete(&format!("/comment/{}", comment_id), &manager.token)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = ctx
        .delete(&format!("/comment/{}", comment_id), &manager.token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_attachments() {
    let ctx = TestContext::new().await;
    let manager = ctx.user("max", "manager").await;
    let member = ctx.user("mia", "member").await;
    let project_id = ctx.project(&manager.token).await;
    let task = ctx.task(&manager.token, &project_id, None).await;
    let task_id = task["id"].as_str().unwrap();

    let (status, body) = ctx
        .upload(task_id, &member.token, "notes.txt", "text/plain", b"hello")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only .eml or .pdf files are allowed");

    let mail = b"From: mia@example.com\r\nSubject: Hi\r\n\r\nBody";
    let (status, info) = ctx
        .upload(task_id, &member.token, "Thread.EML", "message/rfc822", mail)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["filename"], "Thread.EML");
    assert_eq!(info["size"], mail.len());

    let (status, list) = ctx
        .get(&format!("/project/tasks/{}/attachments", task_id), &member.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert!(list[0].get("data").is_none());

    let request = Request::builder()
        .uri(format!(
            "/project/attachments/download/{}",
            info["id"].as_str().unwrap()
        ))
        .header(header::AUTHORIZATION, format!("Bearer {}", member.token))
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "message/rfc822");
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"Thread.EML\""
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], &mail[..]);
}

#[tokio::test]
async fn test_upload_limits() {
    let ctx = TestContext::new().await;
    let member = ctx.user("mia", "member").await;
    let project_id = ctx.project(&ctx.admin.token).await;
    let task = ctx.task(&ctx.admin.token, &project_id, None).await;
    let task_id = task["id"].as_str().unwrap();

    let long_name = format!("{}.pdf", "a".repeat(300));
    let (status, body) = ctx
        .upload(task_id, &member.token, &long_name, "application/pdf", b"%PDF")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "File name must be at most 255 characters");

    let oversized = vec![b'x'; MAX_UPLOAD_BYTES + 1];
    let (status, body) = ctx
        .upload(task_id, &member.token, "big.pdf", "application/pdf", &oversized)
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "payload_too_large");

    let (status, body) = ctx
        .send_raw(
            Method::POST,
            &format!("/project/tasks/{}/attachments", task_id),
            Some(&member.token),
            "application/json",
            b"{}".to_vec(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_malformed_requests_use_error_format() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post(
            "/project/create-projects",
            &ctx.admin.token,
            json!({ "title": "Launch", "start_date": in_days(1) }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "body");

    let (status, body) = ctx
        .post(
            "/project/create-projects",
            &ctx.admin.token,
            json!({
                "title": "Launch",
                "start_date": "tomorrow",
                "due_date": in_days(30),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = ctx
        .send_raw(
            Method::POST,
            "/auth/login",
            None,
            "application/json",
            b"{\"email\":".to_vec(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = ctx.get("/project/not-a-uuid/tasks", &ctx.admin.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].as_str().is_some());

    let (status, body) = ctx
        .get("/summary/user-summary?user_id=nope", &ctx.admin.token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_tools() {
    let ctx = TestContext::new().await;
    let manager = ctx.user("max", "manager").await;
    let member = ctx.user("mia", "member").await;
    let project_id = ctx.project(&manager.token).await;

    let (status, _) = ctx
        .post(&format!("/tool/{}/tools", project_id), &member.token, json!({ "name": "Figma" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, tool) = ctx
        .post(&format!("/tool/{}/tools", project_id), &manager.token, json!({ "name": "Figma" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let tool_id = tool["id"].as_str().unwrap();

    let (status, _) = ctx
        .post(
            "/project/create-tasks",
            &manager.token,
            json!({
                "project_id": project_id,
                "title": "Mockups",
                "start_date": in_days(2),
                "due_date": in_days(4),
                "tool_id": tool_id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, tools) = ctx.get(&format!("/tool/{}/tools", project_id), &member.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tools[0]["name"], "Figma");

    let (status, tasks) = ctx
        .get(&format!("/tool/{}/tools/{}/tasks", project_id, tool_id), &member.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks[0]["title"], "Mockups");

    let (status, body) = ctx
        .delete(&format!("/tool/tools/{}", tool_id), &manager.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Tool deleted successfully");

    let (status, tasks) = ctx
        .get(&format!("/project/{}/tasks", project_id), &member.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(tasks[0]["tool_id"].is_null());
}

#[tokio::test]
async fn test_summaries() {
    let ctx = TestContext::new().await;
    let manager = ctx.user("max", "manager").await;
    let member = ctx.user("mia", "member").await;
    let project_id = ctx.project(&manager.token).await;

    // one due in ten days, one due tomorrow
    ctx.task(&manager.token, &project_id, Some(member.id.as_str())).await;
    let (status, _) = ctx
        .post(
            "/project/create-tasks",
            &manager.token,
            json!({
                "project_id": project_id,
                "title": "Urgent",
                "start_date": in_days(1),
                "due_date": in_days(1),
                "assigned_to": member.id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, summary) = ctx.get("/summary/user-summary", &member.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["username"], "mia");
    assert_eq!(summary["assigned_tasks"], 2);
    assert_eq!(summary["completed_tasks"], 0);
    assert_eq!(summary["overdue_tasks"], 0);
    assert_eq!(summary["soon_due_tasks"], 1);

    let (status, tasks) = ctx.get("/summary/tasks/due_soon", &member.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks[0]["title"], "Urgent");

    let (status, body) = ctx.get("/summary/tasks/blocked", &member.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid status filter");

    let override_uri = format!("/summary/user-summary?user_id={}", member.id);
    let (status, _) = ctx.get(&override_uri, &manager.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, summary) = ctx.get(&override_uri, &ctx.admin.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["assigned_tasks"], 2);

    let (status, _) = ctx.get("/summary/project-summary", &member.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, projects) = ctx.get("/summary/project-summary", &manager.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(projects[0]["total_tasks"], 2);
    assert_eq!(projects[0]["pending_tasks"], 2);
}

#[tokio::test]
async fn test_project_delete_cascades() {
    let ctx = TestContext::new().await;
    let manager = ctx.user("max", "manager").await;
    let member = ctx.user("mia", "member").await;
    let project_id = ctx.project(&manager.token).await;
    let task = ctx.task(&manager.token, &project_id, Some(member.id.as_str())).await;
    let task_id = task["id"].as_str().unwrap();

    ctx.post(&format!("/tool/{}/tools", project_id), &manager.token, json!({ "name": "Figma" }))
        .await;
    ctx.post(
        &format!("/comment/task/{}", task_id),
        &member.token,
        json!({ "content": "On it" }),
    )
    .await;
    ctx.upload(task_id, &member.token, "brief.pdf", "application/pdf", b"%PDF-1.4")
        .await;

    let counts = ctx.db.table_counts().await;
    assert_eq!(
        (counts.projects, counts.tasks, counts.tools, counts.comments, counts.attachments),
        (1, 1, 1, 1, 1)
    );

    let (status, body) = ctx
        .delete(&format!("/project/delete-project/{}", project_id), &manager.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project has been deleted successfully");

    assert_eq!(
        ctx.db.table_counts().await,
        TableCounts {
            users: 3,
            ..TableCounts::default()
        }
    );
}
