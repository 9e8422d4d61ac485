//! Account queries

use sqlx::SqlitePool;
use uuid::Uuid;
use zhiyuan_common::db::{StoredCredentials, User};
use zhiyuan_common::Result;

/// Insert a new user with pre-hashed credentials
///
/// Returns the created row. A duplicate username or email surfaces as a
/// database error carrying a unique violation.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    password_salt: &str,
) -> Result<User> {
    let guid = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO users (guid, username, email, password_hash, password_salt, role)
        VALUES (?, ?, ?, ?, ?, 'user')
        "#,
    )
    .bind(&guid)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(password_salt)
    .execute(pool)
    .await?;

    Ok(User {
        guid,
        username: username.to_string(),
        email: email.to_string(),
        role: "user".to_string(),
    })
}

/// Load credential material for login verification
pub async fn find_credentials(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<StoredCredentials>> {
    let row: Option<(String, String, String, String, String)> = sqlx::query_as(
        "SELECT guid, username, role, password_hash, password_salt FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(guid, username, role, password_hash, password_salt)| StoredCredentials {
        guid,
        username,
        role,
        password_hash,
        password_salt,
    }))
}

pub async fn find_by_guid(pool: &SqlitePool, guid: &str) -> Result<Option<User>> {
    let row: Option<(String, String, String, String)> =
        sqlx::query_as("SELECT guid, username, email, role FROM users WHERE guid = ?")
            .bind(guid)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(guid, username, email, role)| User {
        guid,
        username,
        email,
        role,
    }))
}

/// List all accounts, oldest first
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows: Vec<(String, String, String, String)> =
        sqlx::query_as("SELECT guid, username, email, role FROM users ORDER BY created_at, username")
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(guid, username, email, role)| User {
            guid,
            username,
            email,
            role,
        })
        .collect())
}

/// Delete an account; returns false when no row matched
pub async fn delete_user(pool: &SqlitePool, guid: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE guid = ?")
        .bind(guid)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Change an account's role; returns false when no row matched
pub async fn set_role(pool: &SqlitePool, guid: &str, role: &str) -> Result<bool> {
    let result =
        sqlx::query("UPDATE users SET role = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?")
            .bind(role)
            .bind(guid)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}
