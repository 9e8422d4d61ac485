//! Database access layer for zhiyuan-web
//!
//! Every statement uses bound parameters; no SQL is ever assembled from
//! request values.

pub mod admissions;
pub mod announcements;
pub mod favorites;
pub mod profiles;
pub mod sessions;
pub mod users;

/// True when a sqlx error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
