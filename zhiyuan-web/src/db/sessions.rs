//! Login session persistence
//!
//! Sessions are rows keyed by an opaque token; expiry is an RFC 3339
//! timestamp compared in UTC. Expired rows are ignored by lookups and
//! removed opportunistically at startup.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use zhiyuan_common::auth::generate_session_token;
use zhiyuan_common::db::User;
use zhiyuan_common::Result;

/// Create a session for a user, returning the opaque token
pub async fn create_session(
    pool: &SqlitePool,
    user_id: &str,
    timeout_seconds: i64,
) -> Result<String> {
    let token = generate_session_token();
    let expires_at = (Utc::now() + Duration::seconds(timeout_seconds)).to_rfc3339();

    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(&expires_at)
        .execute(pool)
        .await?;

    Ok(token)
}

/// Resolve a session token to its user, ignoring expired sessions
pub async fn find_user_by_token(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
    let row: Option<(String, String, String, String)> = sqlx::query_as(
        r#"
        SELECT u.guid, u.username, u.email, u.role
        FROM sessions s
        JOIN users u ON u.guid = s.user_id
        WHERE s.token = ?
          AND datetime(s.expires_at) > datetime('now')
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(guid, username, email, role)| User {
        guid,
        username,
        email,
        role,
    }))
}

/// Remove one session (logout)
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

/// Remove all expired sessions, returning how many were dropped
pub async fn purge_expired(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE datetime(expires_at) <= datetime('now')")
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
