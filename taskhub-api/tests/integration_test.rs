/// Integration tests for the TaskHub API
///
/// These drive the full router in-process against a real Postgres:
/// authentication, authorization asymmetries, partial updates, cascade
/// deletes, and the per-status tally.
///
/// All tests are `#[ignore]`d by default because they need a live
/// database. Run them with:
///
/// ```bash
/// DATABASE_URL=postgresql://localhost/taskhub_test \
/// JWT_SECRET=integration-test-secret-at-least-32b \
/// cargo test -p taskhub-api -- --ignored
/// ```

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;
use taskhub_shared::models::project::Project;
use taskhub_shared::models::task::Task;
use taskhub_shared::models::user::{User, UserRole};
use uuid::Uuid;

/// Register → login → logout; a second logout with the same token fails.
#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL and JWT_SECRET)"]
async fn test_register_login_logout_flow() {
    let ctx = TestContext::new().await.unwrap();
    let username = format!("flow-{}", Uuid::new_v4());

    let (status, body) = ctx
        .request(
            "POST",
            "/register/",
            None,
            Some(json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": common::TEST_PASSWORD,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

    let (status, body) = ctx
        .request(
            "POST",
            "/login/",
            None,
            Some(json!({
                "username": username,
                "password": common::TEST_PASSWORD,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    let access = body["access"].as_str().unwrap().to_string();
    assert!(body["refresh"].is_string());

    // First logout succeeds
    let (status, _) = ctx.request("POST", "/logout/", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);

    // The token no longer authenticates: its session row is gone
    let (status, _) = ctx.request("POST", "/logout/", Some(&access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Bad credentials are reported as 400, matching the shipped contract.
#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL and JWT_SECRET)"]
async fn test_login_bad_credentials_is_400() {
    let ctx = TestContext::new().await.unwrap();
    let (user, _) = ctx.create_user(UserRole::User).await.unwrap();

    let (status, _) = ctx
        .request(
            "POST",
            "/login/",
            None,
            Some(json!({"username": user.username, "password": "wrong"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// A refresh token mints a new, independently revocable access token.
#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL and JWT_SECRET)"]
async fn test_token_refresh() {
    let ctx = TestContext::new().await.unwrap();
    let (user, _) = ctx.create_user(UserRole::User).await.unwrap();

    let (status, body) = ctx
        .request(
            "POST",
            "/token/",
            None,
            Some(json!({"username": user.username, "password": common::TEST_PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "token obtain failed: {}", body);
    let refresh = body["refresh"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .request("POST", "/token/refresh/", None, Some(json!({"refresh": refresh})))
        .await;
    assert_eq!(status, StatusCode::OK, "refresh failed: {}", body);
    let new_access = body["access"].as_str().unwrap().to_string();

    // The refreshed token authenticates
    let (status, _) = ctx
        .request("GET", "/user/profile/", Some(&new_access), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

/// A non-manager calling project create receives 403 and nothing is
/// persisted.
#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL and JWT_SECRET)"]
async fn test_non_manager_cannot_create_project() {
    let ctx = TestContext::new().await.unwrap();
    let (user, token) = ctx.create_user(UserRole::User).await.unwrap();

    let (status, _) = ctx
        .request(
            "POST",
            "/projects/",
            Some(&token),
            Some(json!({"name": "Forbidden project"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let projects = Project::list_by_manager(&ctx.db, user.id).await.unwrap();
    assert!(projects.is_empty());
}

/// End-to-end scenario: manager M creates project P, creates task
/// T assigned to U, U sees it under /tasks/assignedto/, M deletes P, T is
/// gone (cascade).
#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL and JWT_SECRET)"]
async fn test_manager_project_task_lifecycle() {
    let ctx = TestContext::new().await.unwrap();
    let (_manager, m_token) = ctx.create_user(UserRole::Manager).await.unwrap();
    let (assignee, a_token) = ctx.create_user(UserRole::User).await.unwrap();

    // M creates project P
    let (status, body) = ctx
        .request(
            "POST",
            "/projects/",
            Some(&m_token),
            Some(json!({"name": "Launch"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create project: {}", body);
    let project_id: Uuid = body["project_id"].as_str().unwrap().parse().unwrap();

    // M creates task T under P, assigned to U
    let (status, body) = ctx
        .request(
            "POST",
            &format!("/projects/{}/tasks/create/", project_id),
            Some(&m_token),
            Some(json!({
                "title": "Write launch notes",
                "assignedTo": assignee.id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create task: {}", body);
    let task_id: Uuid = body["task_id"].as_str().unwrap().parse().unwrap();

    // U sees T in their assigned list, with the assignee expanded
    let (status, body) = ctx
        .request("GET", "/tasks/assignedto/", Some(&a_token), None)
        .await;
    assert_eq!(status, StatusCode::OK, "assignedto: {}", body);
    let tasks = body.as_array().unwrap();
    let found = tasks
        .iter()
        .find(|t| t["id"] == json!(task_id))
        .expect("task should appear in assignee's list");
    assert_eq!(found["assigned_to"]["username"], json!(assignee.username));

    // M deletes P; T goes with it
    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/projects/{}/delete/", project_id),
            Some(&m_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let task = Task::find_by_id(&ctx.db, task_id).await.unwrap();
    assert!(task.is_none(), "cascade should have removed the task");
}

/// Updating a task with only a status payload changes status and leaves
/// everything else unchanged; completion stamps completed_by.
#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL and JWT_SECRET)"]
async fn test_partial_task_update() {
    let ctx = TestContext::new().await.unwrap();
    let (manager, m_token) = ctx.create_user(UserRole::Manager).await.unwrap();
    let (assignee, _) = ctx.create_user(UserRole::User).await.unwrap();

    let (_, body) = ctx
        .request(
            "POST",
            "/projects/",
            Some(&m_token),
            Some(json!({"name": "Partial updates"})),
        )
        .await;
    let project_id: Uuid = body["project_id"].as_str().unwrap().parse().unwrap();

    let (_, body) = ctx
        .request(
            "POST",
            &format!("/projects/{}/tasks/create/", project_id),
            Some(&m_token),
            Some(json!({
                "title": "Original title",
                "description": "Original description",
                "assignedTo": assignee.id,
            })),
        )
        .await;
    let task_id: Uuid = body["task_id"].as_str().unwrap().parse().unwrap();

    let (status, body) = ctx
        .request(
            "PATCH",
            &format!("/tasks/{}/update/", task_id),
            Some(&m_token),
            Some(json!({"status": "completed"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "update: {}", body);

    let task = Task::find_by_id(&ctx.db, task_id).await.unwrap().unwrap();
    assert_eq!(task.status, "completed");
    assert_eq!(task.title, "Original title");
    assert_eq!(task.description, "Original description");
    assert_eq!(task.assigned_to, Some(assignee.id));
    assert_eq!(task.completed_by, Some(manager.id));
}

/// A non-owner can read a project by id but gets 404 on update/delete of
/// that same project.
#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL and JWT_SECRET)"]
async fn test_project_read_open_but_writes_owner_scoped() {
    let ctx = TestContext::new().await.unwrap();
    let (_owner, owner_token) = ctx.create_user(UserRole::Manager).await.unwrap();
    let (_other, other_token) = ctx.create_user(UserRole::Manager).await.unwrap();

    let (_, body) = ctx
        .request(
            "POST",
            "/projects/",
            Some(&owner_token),
            Some(json!({"name": "Asymmetry"})),
        )
        .await;
    let project_id: Uuid = body["project_id"].as_str().unwrap().parse().unwrap();

    // Read succeeds for the non-owner
    let (status, body) = ctx
        .request(
            "GET",
            &format!("/projects/{}/", project_id),
            Some(&other_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Asymmetry");
    assert!(body["task_counts"].is_object());

    // Update and delete collapse to 404 for the non-owner
    let (status, _) = ctx
        .request(
            "PUT",
            &format!("/projects/{}/update/", project_id),
            Some(&other_token),
            Some(json!({"name": "Hijacked"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/projects/{}/delete/", project_id),
            Some(&other_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Still intact and unrenamed
    let project = Project::find_by_id(&ctx.db, project_id).await.unwrap().unwrap();
    assert_eq!(project.name, "Asymmetry");
}

/// The tally covers exactly {todo, in-progress, completed}; other status
/// strings land in no bucket.
#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL and JWT_SECRET)"]
async fn test_count_tasks_by_status_excludes_unknown() {
    let ctx = TestContext::new().await.unwrap();
    let (_manager, m_token) = ctx.create_user(UserRole::Manager).await.unwrap();
    let (assignee, _) = ctx.create_user(UserRole::User).await.unwrap();

    let (_, body) = ctx
        .request(
            "POST",
            "/projects/",
            Some(&m_token),
            Some(json!({"name": "Tally"})),
        )
        .await;
    let project_id: Uuid = body["project_id"].as_str().unwrap().parse().unwrap();

    for status in ["todo", "todo", "in-progress", "completed", "blocked"] {
        let (code, body) = ctx
            .request(
                "POST",
                &format!("/projects/{}/tasks/create/", project_id),
                Some(&m_token),
                Some(json!({
                    "title": format!("{} task", status),
                    "assignedTo": assignee.id,
                    "status": status,
                })),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED, "create: {}", body);
    }

    let counts = Project::count_tasks_by_status(&ctx.db, project_id)
        .await
        .unwrap();
    assert_eq!(counts.todo, 2);
    assert_eq!(counts.in_progress, 1);
    assert_eq!(counts.completed, 1);
    // The "blocked" task is in no bucket
    assert_eq!(counts.total(), 4);
}

/// Deleting a user nulls assignments on dependent tasks without deleting
/// the tasks.
#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL and JWT_SECRET)"]
async fn test_user_delete_nulls_task_assignment() {
    let ctx = TestContext::new().await.unwrap();
    let (_manager, m_token) = ctx.create_user(UserRole::Manager).await.unwrap();
    let (assignee, _) = ctx.create_user(UserRole::User).await.unwrap();

    let (_, body) = ctx
        .request(
            "POST",
            "/projects/",
            Some(&m_token),
            Some(json!({"name": "Orphaned assignments"})),
        )
        .await;
    let project_id: Uuid = body["project_id"].as_str().unwrap().parse().unwrap();

    let (_, body) = ctx
        .request(
            "POST",
            &format!("/projects/{}/tasks/create/", project_id),
            Some(&m_token),
            Some(json!({"title": "Survivor", "assignedTo": assignee.id})),
        )
        .await;
    let task_id: Uuid = body["task_id"].as_str().unwrap().parse().unwrap();

    let deleted = User::delete(&ctx.db, assignee.id).await.unwrap();
    assert!(deleted);

    let task = Task::find_by_id(&ctx.db, task_id).await.unwrap().unwrap();
    assert_eq!(task.assigned_to, None);
}

/// An empty assigned-task list is a 404, per the shipped contract.
#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL and JWT_SECRET)"]
async fn test_assignedto_empty_is_404() {
    let ctx = TestContext::new().await.unwrap();
    let (_user, token) = ctx.create_user(UserRole::User).await.unwrap();

    let (status, _) = ctx
        .request("GET", "/tasks/assignedto/", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Task creation via /create/ without assignedTo is a 400 with field
/// details; with an unresolvable assignee it is a 404.
#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL and JWT_SECRET)"]
async fn test_task_create_assignee_validation() {
    let ctx = TestContext::new().await.unwrap();
    let (_manager, m_token) = ctx.create_user(UserRole::Manager).await.unwrap();

    let (_, body) = ctx
        .request(
            "POST",
            "/projects/",
            Some(&m_token),
            Some(json!({"name": "Validation"})),
        )
        .await;
    let project_id: Uuid = body["project_id"].as_str().unwrap().parse().unwrap();

    let (status, body) = ctx
        .request(
            "POST",
            &format!("/projects/{}/tasks/create/", project_id),
            Some(&m_token),
            Some(json!({"title": "No assignee"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "assignedTo");

    let (status, _) = ctx
        .request(
            "POST",
            &format!("/projects/{}/tasks/create/", project_id),
            Some(&m_token),
            Some(json!({"title": "Ghost assignee", "assignedTo": Uuid::new_v4()})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
