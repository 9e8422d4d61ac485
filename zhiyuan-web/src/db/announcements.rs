//! Announcement queries
//!
//! `expire_time` is optional RFC 3339; comparisons go through SQLite's
//! `datetime()` so the stored format and `datetime('now')` agree.

use sqlx::SqlitePool;
use uuid::Uuid;
use zhiyuan_common::db::Announcement;
use zhiyuan_common::Result;

fn map_rows(rows: Vec<(String, String, String, Option<String>, i64, String)>) -> Vec<Announcement> {
    rows.into_iter()
        .map(|(guid, title, content, expire_time, is_pinned, created_at)| Announcement {
            guid,
            title,
            content,
            expire_time,
            is_pinned: is_pinned != 0,
            created_at,
        })
        .collect()
}

/// All unexpired announcements, pinned first, then newest first
pub async fn list_active(pool: &SqlitePool) -> Result<Vec<Announcement>> {
    let rows: Vec<(String, String, String, Option<String>, i64, String)> = sqlx::query_as(
        r#"
        SELECT guid, title, content, expire_time, is_pinned, created_at
        FROM announcements
        WHERE expire_time IS NULL OR datetime(expire_time) > datetime('now')
        ORDER BY is_pinned DESC, created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(map_rows(rows))
}

/// The newest `count` unexpired announcements
pub async fn latest(pool: &SqlitePool, count: i64) -> Result<Vec<Announcement>> {
    let rows: Vec<(String, String, String, Option<String>, i64, String)> = sqlx::query_as(
        r#"
        SELECT guid, title, content, expire_time, is_pinned, created_at
        FROM announcements
        WHERE expire_time IS NULL OR datetime(expire_time) > datetime('now')
        ORDER BY is_pinned DESC, created_at DESC
        LIMIT ?
        "#,
    )
    .bind(count)
    .fetch_all(pool)
    .await?;

    Ok(map_rows(rows))
}

/// Publish an announcement, returning its guid
pub async fn create(
    pool: &SqlitePool,
    title: &str,
    content: &str,
    expire_time: Option<&str>,
    is_pinned: bool,
) -> Result<String> {
    let guid = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO announcements (guid, title, content, expire_time, is_pinned)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(title)
    .bind(content)
    .bind(expire_time)
    .bind(is_pinned as i64)
    .execute(pool)
    .await?;

    Ok(guid)
}

/// Delete an announcement; returns false when no row matched
pub async fn delete(pool: &SqlitePool, guid: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM announcements WHERE guid = ?")
        .bind(guid)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
