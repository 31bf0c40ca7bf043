/// Authentication context and middleware errors
///
/// The API server's auth layer validates the bearer token, checks the
/// session store, and inserts an [`AuthContext`] into request extensions.
/// Handlers extract it with Axum's `Extension` extractor:
///
/// ```
/// use axum::Extension;
/// use taskhub_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// Authentication context added to request extensions
///
/// Present on every request that passed the auth layer. Carries everything
/// the guards need: who is calling, with what role, via which token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Account role from the token claims
    pub role: UserRole,

    /// JWT ID of the presented access token (the session key; logout
    /// revokes by this)
    pub token_id: Uuid,
}

impl AuthContext {
    /// Creates an auth context from validated JWT claims
    pub fn from_claims(user_id: Uuid, role: UserRole, token_id: Uuid) -> Self {
        Self {
            user_id,
            role,
            token_id,
        }
    }
}

/// Error type for the authentication layer
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// Token is valid but its session has been revoked or expired
    SessionRevoked,

    /// Database error while checking the session
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::SessionRevoked => {
                (StatusCode::UNAUTHORIZED, "Session not found or expired").into_response()
            }
            AuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_context_from_claims() {
        let user_id = Uuid::new_v4();
        let token_id = Uuid::new_v4();

        let context = AuthContext::from_claims(user_id, UserRole::Manager, token_id);

        assert_eq!(context.user_id, user_id);
        assert_eq!(context.role, UserRole::Manager);
        assert_eq!(context.token_id, token_id);
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AuthError::SessionRevoked.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::DatabaseError("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
