//! Per-user profile queries

use sqlx::SqlitePool;
use zhiyuan_common::db::UserProfile;
use zhiyuan_common::Result;

/// Load a user's profile, creating the defaults on first access
pub async fn get_or_create(pool: &SqlitePool, user_id: &str) -> Result<UserProfile> {
    let row: Option<(String, String, i64)> = sqlx::query_as(
        "SELECT province, exam_type, last_rank FROM user_profiles WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    if let Some((province, exam_type, last_rank)) = row {
        return Ok(UserProfile {
            province,
            exam_type,
            last_rank,
        });
    }

    let defaults = UserProfile::default();
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO user_profiles (user_id, province, exam_type, last_rank)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&defaults.province)
    .bind(&defaults.exam_type)
    .bind(defaults.last_rank)
    .execute(pool)
    .await?;

    Ok(defaults)
}

/// Insert or update a user's profile
pub async fn upsert(pool: &SqlitePool, user_id: &str, profile: &UserProfile) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_profiles (user_id, province, exam_type, last_rank)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            province = excluded.province,
            exam_type = excluded.exam_type,
            last_rank = excluded.last_rank,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(user_id)
    .bind(&profile.province)
    .bind(&profile.exam_type)
    .bind(profile.last_rank)
    .execute(pool)
    .await?;

    Ok(())
}
