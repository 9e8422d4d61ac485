//! Wishlist queries
//!
//! Updates use one fixed statement per field combination rather than
//! assembling SET clauses dynamically.

use sqlx::SqlitePool;
use uuid::Uuid;
use zhiyuan_common::db::Favorite;
use zhiyuan_common::Result;

/// A user's wishlist ordered by position, newest first within ties
pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<Favorite>> {
    let rows: Vec<(String, String, String, String, i64, Option<String>, String)> = sqlx::query_as(
        r#"
        SELECT guid, school, major, category, sort_order, note, created_at
        FROM user_favorites
        WHERE user_id = ?
        ORDER BY sort_order ASC, created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(guid, school, major, category, sort_order, note, created_at)| Favorite {
            guid,
            school,
            major,
            category,
            sort_order,
            note,
            created_at,
        })
        .collect())
}

/// Append a wishlist entry at the end of the user's ordering
///
/// Returns the new guid. A duplicate (school, major) for the same user
/// surfaces as a unique-violation database error.
pub async fn insert(
    pool: &SqlitePool,
    user_id: &str,
    school: &str,
    major: &str,
    category: &str,
    note: Option<&str>,
) -> Result<String> {
    let next_order: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM user_favorites WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let guid = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO user_favorites (guid, user_id, school, major, category, sort_order, note)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(user_id)
    .bind(school)
    .bind(major)
    .bind(category)
    .bind(next_order)
    .bind(note)
    .execute(pool)
    .await?;

    Ok(guid)
}

/// Delete an entry owned by the user; returns false when no row matched
pub async fn delete(pool: &SqlitePool, user_id: &str, guid: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM user_favorites WHERE guid = ? AND user_id = ?")
        .bind(guid)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Update category and/or note on an entry owned by the user
///
/// At least one field must be provided. Returns false when no row
/// matched.
pub async fn update(
    pool: &SqlitePool,
    user_id: &str,
    guid: &str,
    category: Option<&str>,
    note: Option<&str>,
) -> Result<bool> {
    let result = match (category, note) {
        (Some(category), Some(note)) => {
            sqlx::query(
                "UPDATE user_favorites SET category = ?, note = ? WHERE guid = ? AND user_id = ?",
            )
            .bind(category)
            .bind(note)
            .bind(guid)
            .bind(user_id)
            .execute(pool)
            .await?
        }
        (Some(category), None) => {
            sqlx::query("UPDATE user_favorites SET category = ? WHERE guid = ? AND user_id = ?")
                .bind(category)
                .bind(guid)
                .bind(user_id)
                .execute(pool)
                .await?
        }
        (None, Some(note)) => {
            sqlx::query("UPDATE user_favorites SET note = ? WHERE guid = ? AND user_id = ?")
                .bind(note)
                .bind(guid)
                .bind(user_id)
                .execute(pool)
                .await?
        }
        (None, None) => return Ok(false),
    };

    Ok(result.rows_affected() > 0)
}

/// Rewrite sort positions to match the given guid order
pub async fn reorder(pool: &SqlitePool, user_id: &str, ordered_guids: &[String]) -> Result<()> {
    for (index, guid) in ordered_guids.iter().enumerate() {
        sqlx::query("UPDATE user_favorites SET sort_order = ? WHERE guid = ? AND user_id = ?")
            .bind(index as i64)
            .bind(guid)
            .bind(user_id)
            .execute(pool)
            .await?;
    }

    Ok(())
}
