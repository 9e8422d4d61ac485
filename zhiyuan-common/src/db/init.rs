//! Database initialization
//!
//! Creates the schema on first run and keeps defaults present on every
//! startup. All statements are idempotent; running initialization twice
//! is safe.

use crate::auth::{generate_salt, hash_password};
use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode allows concurrent readers while a request writes
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    // Schema creation (idempotent - safe to call multiple times)
    create_users_table(&pool).await?;
    create_sessions_table(&pool).await?;
    create_admissions_table(&pool).await?;
    create_user_profiles_table(&pool).await?;
    create_announcements_table(&pool).await?;
    create_user_favorites_table(&pool).await?;
    create_settings_table(&pool).await?;

    init_default_settings(&pool).await?;
    seed_sample_admissions(&pool).await?;

    Ok(pool)
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(guid) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            expires_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the admissions table
///
/// One row per (province, exam track, year, school, major) historical
/// admission statistic. `min_rank` may be NULL for rows imported from
/// incomplete sources; such rows never reach the recommendation engine.
pub async fn create_admissions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS admissions (
            guid TEXT PRIMARY KEY,
            province TEXT NOT NULL,
            exam_type TEXT NOT NULL,
            year INTEGER NOT NULL,
            school TEXT NOT NULL,
            major TEXT NOT NULL,
            min_score INTEGER,
            min_rank INTEGER,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (year >= 2000 AND year <= 2100),
            CHECK (min_rank IS NULL OR min_rank >= 0),
            CHECK (min_score IS NULL OR min_score >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_admissions_query ON admissions(province, exam_type, year)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_admissions_school ON admissions(school)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_user_profiles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_profiles (
            user_id TEXT PRIMARY KEY REFERENCES users(guid) ON DELETE CASCADE,
            province TEXT NOT NULL DEFAULT '广东',
            exam_type TEXT NOT NULL DEFAULT '物理类',
            last_rank INTEGER NOT NULL DEFAULT 10000,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (last_rank >= 1)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_announcements_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS announcements (
            guid TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            expire_time TEXT,
            is_pinned INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_announcements_order ON announcements(is_pinned, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_user_favorites_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_favorites (
            guid TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(guid) ON DELETE CASCADE,
            school TEXT NOT NULL,
            major TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'match' CHECK (category IN ('reach', 'match', 'safety')),
            sort_order INTEGER NOT NULL DEFAULT 0,
            note TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (user_id, school, major)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_favorites_user ON user_favorites(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize or update default settings
///
/// This function ensures all required settings exist with default values.
/// It also handles NULL values by resetting them to defaults.
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    // Session settings
    ensure_setting(pool, "session_timeout_seconds", "2592000").await?; // 30 days

    // Recommendation settings
    ensure_setting(pool, "recommend_recent_years", "3").await?;
    ensure_setting(pool, "recommend_limit_per_tier", "0").await?; // 0 = unlimited

    // Announcement settings
    ensure_setting(pool, "announcements_latest_count", "3").await?;

    info!("Default settings initialized");
    Ok(())
}

/// Ensure a setting exists with the specified default value
///
/// If the setting doesn't exist, it will be created with the default.
/// If the setting exists but has a NULL value, it will be reset to the default.
pub async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if !exists {
        // Use INSERT OR IGNORE to handle concurrent initialization race conditions
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(default_value)
            .execute(pool)
            .await?;

        info!("Initialized setting '{}' with default value: {}", key, default_value);
        return Ok(());
    }

    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if value.is_none() {
        sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
            .bind(default_value)
            .bind(key)
            .execute(pool)
            .await?;

        warn!("Setting '{}' was NULL, reset to default: {}", key, default_value);
    }

    Ok(())
}

/// Read an integer setting, falling back to the given default
pub async fn setting_i64(pool: &SqlitePool, key: &str, default: i64) -> Result<i64> {
    let value: Option<i64> =
        sqlx::query_scalar("SELECT CAST(value AS INTEGER) FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(value.unwrap_or(default))
}

/// Insert sample admission records on a fresh database
///
/// A new install has nothing to recommend against until an import runs;
/// the samples make the recommend endpoint exercisable out of the box.
async fn seed_sample_admissions(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admissions")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let samples: [(&str, &str, i64, &str, &str, i64, i64); 5] = [
        ("广东", "物理类", 2023, "中山大学", "计算机科学与技术", 635, 4500),
        ("广东", "物理类", 2024, "华南理工大学", "人工智能", 628, 5200),
        ("广东", "历史类", 2023, "暨南大学", "新闻学", 605, 1800),
        ("广东", "物理类", 2023, "深圳大学", "电子信息工程", 615, 8500),
        ("广东", "历史类", 2024, "华南师范大学", "汉语言文学", 610, 2200),
    ];

    for (province, exam_type, year, school, major, min_score, min_rank) in samples {
        sqlx::query(
            r#"
            INSERT INTO admissions (guid, province, exam_type, year, school, major, min_score, min_rank)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(province)
        .bind(exam_type)
        .bind(year)
        .bind(school)
        .bind(major)
        .bind(min_score)
        .bind(min_rank)
        .execute(pool)
        .await?;
    }

    info!("Seeded {} sample admission records", samples.len());
    Ok(())
}

/// Create or update the bootstrap admin account
///
/// The password comes from explicit startup configuration (CLI flag or
/// environment variable). Without one, existing accounts are left alone
/// and a warning is logged when no admin exists at all.
pub async fn bootstrap_admin(pool: &SqlitePool, admin_password: Option<&str>) -> Result<()> {
    match admin_password {
        Some(password) => {
            let salt = generate_salt();
            let hash = hash_password(&salt, password);

            sqlx::query(
                r#"
                INSERT INTO users (guid, username, email, password_hash, password_salt, role)
                VALUES (?, 'admin', 'admin@example.com', ?, ?, 'admin')
                ON CONFLICT(username) DO UPDATE SET
                    password_hash = excluded.password_hash,
                    password_salt = excluded.password_salt,
                    role = 'admin',
                    updated_at = CURRENT_TIMESTAMP
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&hash)
            .bind(&salt)
            .execute(pool)
            .await?;

            info!("Admin account provisioned from startup configuration");
        }
        None => {
            let admins: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
                    .fetch_one(pool)
                    .await?;
            if admins == 0 {
                warn!(
                    "No admin account exists; start with --admin-password (or ZHIYUAN_ADMIN_PASSWORD) to create one"
                );
            }
        }
    }

    Ok(())
}
