/// User directory endpoints
///
/// # Endpoints
///
/// - `GET /user/profile/` - the authenticated user's own record
/// - `GET /users/` - all users as `{id, username, email}` summaries

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use taskhub_shared::{
    auth::middleware::AuthContext,
    models::user::{User, UserRole, UserSummary},
};
use uuid::Uuid;

/// Profile response
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// User ID
    pub id: Uuid,

    /// Username
    pub username: String,

    /// Email address
    pub email: String,

    /// Account role
    pub role: UserRole,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the user last logged in
    pub last_login_at: Option<DateTime<Utc>>,
}

/// The authenticated user's profile
///
/// # Errors
///
/// - `404 Not Found`: the account behind the token no longer exists
pub async fn profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    Ok(Json(ProfileResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
        created_at: user.created_at,
        last_login_at: user.last_login_at,
    }))
}

/// Lists all users as wire summaries
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserSummary>>> {
    let users = User::list(&state.db).await?;
    let summaries = users.iter().map(User::summary).collect();
    Ok(Json(summaries))
}
