/// Common test utilities for integration tests
///
/// Shared infrastructure for the end-to-end tests:
/// - database connection + migrations
/// - router construction
/// - user creation with issued (session-backed) access tokens
/// - request/response helpers for driving the router in-process

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use taskhub_api::app::{build_router, AppState};
use taskhub_api::config::Config;
use taskhub_shared::auth::jwt::{create_token, Claims, TokenType};
use taskhub_shared::auth::password::hash_password;
use taskhub_shared::models::session::Session;
use taskhub_shared::models::user::{CreateUser, User, UserRole};
use tower::Service as _;
use uuid::Uuid;

/// Password used for every test account
pub const TEST_PASSWORD: &str = "integration-test-password";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context against the configured database
    ///
    /// Requires `DATABASE_URL` and `JWT_SECRET` in the environment (a
    /// `.env` file works).
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path is relative to this crate's Cargo.toml
        sqlx::migrate!("../migrations").run(&db).await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(Self { db, app, config })
    }

    /// Creates a user with a unique username and returns it with a live
    /// access token (session recorded, as login would)
    pub async fn create_user(&self, role: UserRole) -> anyhow::Result<(User, String)> {
        let username = format!("user-{}", Uuid::new_v4());
        let user = User::create(
            &self.db,
            CreateUser {
                username: username.clone(),
                email: format!("{}@example.com", username),
                role,
                password_hash: hash_password(TEST_PASSWORD)?,
            },
        )
        .await?;

        let claims = Claims::new(user.id, user.role, TokenType::Access);
        let token = create_token(&claims, &self.config.jwt.secret)?;
        Session::record(&self.db, claims.jti, user.id, claims.expires_at()).await?;

        Ok((user, token))
    }

    /// Drives a request through the router, returning status and parsed
    /// JSON body (null for empty bodies)
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }
}
