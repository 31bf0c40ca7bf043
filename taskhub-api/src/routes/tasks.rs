/// Task endpoints
///
/// # Endpoints
///
/// - `GET /projects/:id/tasks/` - list a project's tasks
/// - `POST /projects/:id/tasks/` - create a task assigned to the caller
///   (MANAGER only)
/// - `POST /projects/:id/tasks/create/` - create a task for a named
///   assignee (any authenticated caller)
/// - `PUT|PATCH /tasks/:id/update/` - partial update (any authenticated
///   caller; no ownership check, part of the shipped contract)
/// - `DELETE /tasks/:id/delete/` - delete (owning project's manager only;
///   404 collapse)
/// - `GET /tasks/assignedto/` - the caller's assigned tasks; 404 when
///   there are none

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskhub_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{
        project::Project,
        task::{CreateTask, Task, TaskDetail, TaskStatus, UpdateTask},
        user::User,
    },
};
use uuid::Uuid;

/// Create request for `POST /projects/:id/tasks/create/`
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Task title (required)
    pub title: Option<String>,

    /// Description; defaults to empty
    pub description: Option<String>,

    /// Assignee user ID (required on this path)
    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<Uuid>,

    /// Initial status; defaults to "todo"
    pub status: Option<String>,

    /// Initial completion flag; defaults to false
    pub completed: Option<bool>,
}

/// Create request for the manager path `POST /projects/:id/tasks/`
///
/// No assignee field: the created task is assigned to the caller.
#[derive(Debug, Deserialize)]
pub struct CreateOwnTaskRequest {
    /// Task title (required)
    pub title: Option<String>,

    /// Description; defaults to empty
    pub description: Option<String>,

    /// Initial status; defaults to "todo"
    pub status: Option<String>,

    /// Initial completion flag; defaults to false
    pub completed: Option<bool>,
}

/// Partial-update request
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New assignee
    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<Uuid>,

    /// New status string
    pub status: Option<String>,

    /// New completion flag
    pub completed: Option<bool>,
}

/// Summary response carrying the affected task ID
#[derive(Debug, Serialize)]
pub struct TaskSummaryResponse {
    /// Summary message
    pub message: String,

    /// Affected task ID
    pub task_id: Uuid,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteTaskResponse {
    /// Summary message
    pub message: String,
}

/// Lists a project's tasks in wire shape
///
/// # Errors
///
/// - `404 Not Found`: no such project
pub async fn list_project_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskDetail>>> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found.".to_string()))?;

    let tasks = Task::list_by_project(&state.db, project.id).await?;
    Ok(Json(tasks))
}

/// Creates a task under a project, assigned to the caller (MANAGER only)
///
/// # Errors
///
/// - `400 Bad Request`: missing title
/// - `403 Forbidden`: caller is not a MANAGER
/// - `404 Not Found`: no such project
pub async fn create_task_as_manager(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateOwnTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskDetail>)> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found.".to_string()))?;

    authorization::require_manager(auth.role)?;

    let title = req
        .title
        .ok_or_else(|| ApiError::validation("title", "Title is required."))?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title,
            description: req.description.unwrap_or_default(),
            project_id: project.id,
            assigned_to: Some(auth.user_id),
            status: req
                .status
                .unwrap_or_else(|| TaskStatus::Todo.as_str().to_string()),
            completed: req.completed.unwrap_or(false),
        },
    )
    .await?;

    let detail = Task::find_detail(&state.db, task.id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Created task vanished".to_string()))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

/// Creates a task under a project for a named assignee
///
/// # Errors
///
/// - `400 Bad Request`: missing assignedTo or title
/// - `404 Not Found`: no such project, or assignee does not resolve to an
///   existing user
pub async fn create_task(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskSummaryResponse>)> {
    let assigned_to = req
        .assigned_to
        .ok_or_else(|| ApiError::validation("assignedTo", "Assigned user is required."))?;

    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found.".to_string()))?;

    let assignee = User::find_by_id(&state.db, assigned_to)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let title = req
        .title
        .ok_or_else(|| ApiError::validation("title", "Title is required."))?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title,
            description: req.description.unwrap_or_default(),
            project_id: project.id,
            assigned_to: Some(assignee.id),
            status: req
                .status
                .unwrap_or_else(|| TaskStatus::Todo.as_str().to_string()),
            completed: req.completed.unwrap_or(false),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(TaskSummaryResponse {
            message: "Task created successfully.".to_string(),
            task_id: task.id,
        }),
    ))
}

/// Partially updates a task
///
/// Only payload-present fields change. When the update marks the task
/// completed (`completed: true` or `status: "completed"`), the caller is
/// recorded as `completed_by`.
///
/// # Errors
///
/// - `404 Not Found`: no such task, or assignedTo does not resolve
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskSummaryResponse>> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(
                "Task not found or you do not have permission to edit it.".to_string(),
            )
        })?;

    let assigned_to = match req.assigned_to {
        Some(user_id) => {
            let assignee = User::find_by_id(&state.db, user_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Assigned user not found.".to_string()))?;
            Some(assignee.id)
        }
        None => None,
    };

    let marks_completed = req.completed == Some(true)
        || req.status.as_deref() == Some(TaskStatus::Completed.as_str());

    let updated = Task::update(
        &state.db,
        task.id,
        UpdateTask {
            title: req.title,
            description: req.description,
            assigned_to,
            status: req.status,
            completed: req.completed,
            completed_by: marks_completed.then_some(auth.user_id),
        },
    )
    .await?
    .ok_or_else(|| {
        ApiError::NotFound("Task not found or you do not have permission to edit it.".to_string())
    })?;

    Ok(Json(TaskSummaryResponse {
        message: "Task updated successfully.".to_string(),
        task_id: updated.id,
    }))
}

/// Deletes a task (owning project's manager only)
///
/// # Errors
///
/// - `404 Not Found`: no such task, or caller does not manage its project
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    let not_found = || {
        ApiError::NotFound(
            "Task not found or you do not have permission to delete it.".to_string(),
        )
    };

    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(not_found)?;

    let project = Project::find_by_id(&state.db, task.project_id)
        .await?
        .ok_or_else(not_found)?;

    authorization::require_owner(project.manager_id, auth.user_id).map_err(|_| not_found())?;

    Task::delete(&state.db, task.id).await?;

    Ok(Json(DeleteTaskResponse {
        message: "Task deleted successfully.".to_string(),
    }))
}

/// Lists the tasks assigned to the caller
///
/// An empty result is a 404, not an empty list: that is the shipped
/// contract of this endpoint.
pub async fn assigned_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskDetail>>> {
    let tasks = Task::list_by_assignee(&state.db, auth.user_id).await?;

    if tasks.is_empty() {
        return Err(ApiError::NotFound(
            "No tasks found for this user.".to_string(),
        ));
    }

    Ok(Json(tasks))
}
