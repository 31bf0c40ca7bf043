/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Router layout
///
/// ```text
/// /
/// ├── /health                          # liveness + db connectivity (public)
/// ├── /register/  /login/              # identity (public)
/// ├── /token/  /token/refresh/         # token protocol (public)
/// └── authenticated (bearer token + live session):
///     ├── /projects/                   # GET list (own), POST create (manager)
///     ├── /projects/:id/               # GET detail (+ task tally)
///     ├── /projects/:id/update/        # PUT/PATCH (owner manager)
///     ├── /projects/:id/delete/        # DELETE (owner manager, cascades)
///     ├── /projects/:id/tasks/         # GET list, POST create (manager)
///     ├── /projects/:id/tasks/create/  # POST create (requires assignedTo)
///     ├── /tasks/:id/update/           # PUT/PATCH partial update
///     ├── /tasks/:id/delete/           # DELETE (owning project's manager)
///     ├── /tasks/assignedto/           # GET caller's assigned tasks
///     ├── /user/profile/  /users/      # identity reads
///     └── /logout/                     # revoke current session
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Request tracing (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (on the authenticated sub-router)

use crate::config::Config;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskhub_shared::auth::{
    jwt,
    middleware::{AuthContext, AuthError},
};
use taskhub_shared::models::session::Session;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes (no auth)
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/register/", post(routes::auth::register))
        .route("/login/", post(routes::auth::login))
        .route("/token/", post(routes::auth::obtain_token))
        .route("/token/refresh/", post(routes::auth::refresh));

    // Everything else requires a bearer token with a live session
    let authed_routes = Router::new()
        .route(
            "/projects/",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route("/projects/:id/", get(routes::projects::get_project))
        .route(
            "/projects/:id/update/",
            put(routes::projects::update_project).patch(routes::projects::update_project),
        )
        .route(
            "/projects/:id/delete/",
            delete(routes::projects::delete_project),
        )
        .route(
            "/projects/:id/tasks/",
            get(routes::tasks::list_project_tasks).post(routes::tasks::create_task_as_manager),
        )
        .route(
            "/projects/:id/tasks/create/",
            post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id/update/",
            put(routes::tasks::update_task).patch(routes::tasks::update_task),
        )
        .route("/tasks/:id/delete/", delete(routes::tasks::delete_task))
        .route("/tasks/assignedto/", get(routes::tasks::assigned_tasks))
        .route("/user/profile/", get(routes::users::profile))
        .route("/users/", get(routes::users::list_users))
        .route("/logout/", post(routes::auth::logout))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    Router::new()
        .merge(public_routes)
        .merge(authed_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token, checks that a live session row
/// exists for the token's `jti` (so logged-out tokens are rejected even
/// before their cryptographic expiry), then injects [`AuthContext`] into
/// request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    // Validate token
    let claims = jwt::validate_access_token(token, state.jwt_secret()).map_err(|e| match e {
        jwt::JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        jwt::JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    // The token must still have a live session (logout deletes it)
    let live = Session::is_live(&state.db, claims.jti)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Database error: {}", e)))?;
    if !live {
        return Err(AuthError::SessionRevoked);
    }

    // Create auth context
    let auth_context = AuthContext::from_claims(claims.sub, claims.role, claims.jti);

    // Insert into request extensions
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
