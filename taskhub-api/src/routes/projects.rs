/// Project endpoints
///
/// # Endpoints
///
/// - `GET /projects/` - list the caller's managed projects
/// - `POST /projects/` - create a project (MANAGER only)
/// - `GET /projects/:id/` - project detail + per-status task tally
/// - `PUT|PATCH /projects/:id/update/` - partial update (owner manager)
/// - `DELETE /projects/:id/delete/` - delete, cascading to tasks (owner
///   manager)
///
/// The read-single endpoint is open to any authenticated caller while
/// list/update/delete are owner-scoped; that asymmetry is part of the
/// shipped contract. Ownership failures on update/delete surface as 404,
/// indistinguishable from a missing project.

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
    models::project::{CreateProject, Project, ProjectStatus, TaskStatusCounts, UpdateProject},
};
use uuid::Uuid;

/// Create-project request
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    /// Project name (required)
    pub name: Option<String>,

    /// Description; defaults to empty
    pub description: Option<String>,
}

/// Create-project response
#[derive(Debug, Serialize)]
pub struct CreateProjectResponse {
    /// Summary message
    pub message: String,

    /// Created project ID
    pub project_id: Uuid,
}

/// Partial-update request
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<ProjectStatus>,
}

/// Update response: message plus the updated entity
#[derive(Debug, Serialize)]
pub struct UpdateProjectResponse {
    /// Summary message
    pub message: String,

    /// The project after the update
    pub project: Project,
}

/// Project detail: full serialization plus the point-in-time task tally
#[derive(Debug, Serialize)]
pub struct ProjectDetailResponse {
    /// The project
    #[serde(flatten)]
    pub project: Project,

    /// Tasks under this project, tallied by known status
    pub task_counts: TaskStatusCounts,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteProjectResponse {
    /// Summary message
    pub message: String,
}

/// Lists the caller's managed projects
///
/// Never errors for an empty result; non-managers simply see an empty
/// list.
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = Project::list_by_manager(&state.db, auth.user_id).await?;
    Ok(Json(projects))
}

/// Creates a project owned by the caller
///
/// The manager is always the requesting principal; a client-supplied
/// manager field would be ignored by construction.
///
/// # Errors
///
/// - `400 Bad Request`: missing name
/// - `403 Forbidden`: caller is not a MANAGER
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<CreateProjectResponse>)> {
    authorization::require_manager(auth.role)?;

    let name = req
        .name
        .ok_or_else(|| ApiError::validation("name", "Name is required."))?;

    let project = Project::create(
        &state.db,
        CreateProject {
            name,
            description: req.description.unwrap_or_default(),
            manager_id: auth.user_id,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateProjectResponse {
            message: "Project created successfully.".to_string(),
            project_id: project.id,
        }),
    ))
}

/// Project detail by ID
///
/// Any authenticated caller may read any project. The response embeds the
/// per-status task tally, recomputed on each call.
///
/// # Errors
///
/// - `404 Not Found`: no such project
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<ProjectDetailResponse>> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let task_counts = Project::count_tasks_by_status(&state.db, project.id).await?;

    Ok(Json(ProjectDetailResponse {
        project,
        task_counts,
    }))
}

/// Partially updates a project
///
/// Only payload-present fields change.
///
/// # Errors
///
/// - `404 Not Found`: no such project, or caller is not its manager
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<UpdateProjectResponse>> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| not_found_or_no_permission("edit"))?;

    authorization::require_owner(project.manager_id, auth.user_id)
        .map_err(|_| not_found_or_no_permission("edit"))?;

    let updated = Project::update(
        &state.db,
        project.id,
        UpdateProject {
            name: req.name,
            description: req.description,
            status: req.status,
        },
    )
    .await?
    .ok_or_else(|| not_found_or_no_permission("edit"))?;

    Ok(Json(UpdateProjectResponse {
        message: "Project updated successfully.".to_string(),
        project: updated,
    }))
}

/// Deletes a project
///
/// All tasks under the project go with it (cascade).
///
/// # Errors
///
/// - `404 Not Found`: no such project, or caller is not its manager
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<DeleteProjectResponse>> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| not_found_or_no_permission("delete"))?;

    authorization::require_owner(project.manager_id, auth.user_id)
        .map_err(|_| not_found_or_no_permission("delete"))?;

    Project::delete(&state.db, project.id).await?;

    Ok(Json(DeleteProjectResponse {
        message: "Project deleted successfully.".to_string(),
    }))
}

/// The collapsed not-found/forbidden outcome for owner-scoped operations
fn not_found_or_no_permission(verb: &str) -> ApiError {
    ApiError::NotFound(format!(
        "Project not found or you do not have permission to {} it.",
        verb
    ))
}
