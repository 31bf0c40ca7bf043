/// Session records for issued access tokens
///
/// One row per live access token, keyed by the token's JWT ID. The auth
/// layer looks the row up on every request, so revocation takes effect
/// immediately: logout deletes the row and any later use of that token is
/// rejected. There is no process-global session state.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     jti UUID PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     expires_at TIMESTAMPTZ NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A live access-token session
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// JWT ID of the access token this session backs
    pub jti: Uuid,

    /// User the token was issued to
    pub user_id: Uuid,

    /// Token expiry; rows past this instant no longer authenticate
    pub expires_at: DateTime<Utc>,

    /// When the session was issued
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Records a newly issued access token
    ///
    /// Called by login and token refresh after minting the token.
    pub async fn record(
        pool: &PgPool,
        jti: Uuid,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (jti, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING jti, user_id, expires_at, created_at
            "#,
        )
        .bind(jti)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Checks whether a live (non-expired) session exists for a token
    pub async fn is_live(pool: &PgPool, jti: Uuid) -> Result<bool, sqlx::Error> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT jti FROM sessions WHERE jti = $1 AND expires_at > NOW()",
        )
        .bind(jti)
        .fetch_optional(pool)
        .await?;

        Ok(row.is_some())
    }

    /// Revokes a session by token ID
    ///
    /// Returns true if a session was deleted; false means the token had no
    /// live session (already logged out, or never issued here).
    pub async fn revoke(pool: &PgPool, jti: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE jti = $1")
            .bind(jti)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes expired session rows
    ///
    /// Housekeeping; expired rows already fail `is_live`, this just keeps
    /// the table small. Returns the number of rows removed.
    pub async fn prune_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
