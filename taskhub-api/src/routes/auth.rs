/// Identity and session endpoints
///
/// # Endpoints
///
/// - `POST /register/` - create a user account
/// - `POST /login/` - authenticate and receive an access + refresh pair
/// - `POST /logout/` - revoke the caller's current session
/// - `POST /token/` - token-pair obtain (same contract as login)
/// - `POST /token/refresh/` - exchange a refresh token for a new access
///   token
///
/// Login failures are reported as 400, not 401: that is the public
/// contract this service ships with.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskhub_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::{
        session::Session,
        user::{CreateUser, User, UserRole},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username (must be unique)
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: Option<String>,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// Password
    pub password: Option<String>,

    /// Account role; defaults to USER when omitted
    pub role: Option<UserRole>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Summary message
    pub message: String,

    /// Created user ID
    pub user_id: Uuid,

    /// Created username
    pub username: String,
}

/// Login / token-obtain request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username
    pub username: Option<String>,

    /// Password
    pub password: Option<String>,
}

/// Login / token-obtain response: the token pair
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPairResponse {
    /// Access token (24h, session-tracked)
    pub access: String,

    /// Refresh token (30d)
    pub refresh: String,
}

/// Token refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh: Option<String>,
}

/// Token refresh response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New access token (24h, session-tracked)
    pub access: String,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Summary message
    pub message: String,
}

/// Maps validator errors into the field-detail 400 shape
fn map_validation(e: validator::ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(errors)
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /register/
/// {"username": "alice", "email": "alice@example.com", "password": "..."}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing or invalid fields
/// - `409 Conflict`: username already exists
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    req.validate().map_err(map_validation)?;

    let username = req
        .username
        .ok_or_else(|| ApiError::validation("username", "Username is required."))?;
    let email = req
        .email
        .ok_or_else(|| ApiError::validation("email", "Email is required."))?;
    let plaintext = req
        .password
        .ok_or_else(|| ApiError::validation("password", "Password is required."))?;

    let password_hash = password::hash_password(&plaintext)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username,
            email,
            role: req.role.unwrap_or(UserRole::User),
            password_hash,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully.".to_string(),
            user_id: user.id,
            username: user.username,
        }),
    ))
}

/// Authenticates a user and issues a token pair, recording a session row
/// for the access token
async fn authenticate(state: &AppState, req: LoginRequest) -> ApiResult<TokenPairResponse> {
    let (username, plaintext) = match (req.username, req.password) {
        (Some(u), Some(p)) => (u, p),
        _ => {
            return Err(ApiError::BadRequest(
                "Username and password are required.".to_string(),
            ))
        }
    };

    // One outcome for unknown username and wrong password
    let user = User::find_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid credentials".to_string()))?;

    let valid = password::verify_password(&plaintext, &user.password_hash)?;
    if !valid {
        return Err(ApiError::BadRequest("Invalid credentials".to_string()));
    }

    let access_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Refresh);

    let access = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    // The access token only authenticates while this row lives
    Session::record(
        &state.db,
        access_claims.jti,
        user.id,
        access_claims.expires_at(),
    )
    .await?;

    User::update_last_login(&state.db, user.id).await?;

    Ok(TokenPairResponse { access, refresh })
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /login/
/// {"username": "alice", "password": "..."}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing fields or invalid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    let pair = authenticate(&state, req).await?;
    Ok(Json(pair))
}

/// Token-pair obtain endpoint (`POST /token/`)
///
/// Same contract as login; mounted separately to keep the conventional
/// token-protocol paths alive alongside `/login/`.
pub async fn obtain_token(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    let pair = authenticate(&state, req).await?;
    Ok(Json(pair))
}

/// Token refresh endpoint
///
/// Exchanges a valid refresh token for a new access token. The new access
/// token gets its own session row, so it can itself be revoked by logout.
///
/// # Endpoint
///
/// ```text
/// POST /token/refresh/
/// {"refresh": "eyJ..."}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing refresh token
/// - `401 Unauthorized`: invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let refresh_token = req
        .refresh
        .ok_or_else(|| ApiError::validation("refresh", "Refresh token is required."))?;

    let (claims, access) = jwt::mint_access_from_refresh(&refresh_token, state.jwt_secret())?;

    Session::record(&state.db, claims.jti, claims.sub, claims.expires_at()).await?;

    Ok(Json(RefreshResponse { access }))
}

/// Logout endpoint
///
/// Revokes the session backing the presented access token. A token whose
/// session is already gone is reported as an error, not treated as an
/// idempotent no-op.
///
/// # Errors
///
/// - `400 Bad Request`: token has no live session
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<LogoutResponse>> {
    let revoked = Session::revoke(&state.db, auth.token_id).await?;

    if !revoked {
        return Err(ApiError::BadRequest(
            "Token not found or already expired.".to_string(),
        ));
    }

    Ok(Json(LogoutResponse {
        message: "Logout successful".to_string(),
    }))
}
