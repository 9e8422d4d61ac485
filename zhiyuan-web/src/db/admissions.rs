//! Admission record store queries
//!
//! Maps raw `admissions` rows into the typed records consumed by the
//! recommendation engine and the analysis module. The window of years
//! considered is relative to the newest data present for the queried
//! province and exam track.

use sqlx::SqlitePool;
use zhiyuan_common::Result;

use crate::analysis::YearlyAdmission;
use crate::engine::AdmissionRecord;

/// Fetch per-program average ranks for a province and exam track
///
/// Groups the last `recent_years` years of rows by school + major,
/// averaging the admitted rank (rounded to an integer) and taking the
/// lowest recorded score. Rows without rank data are ignored.
pub async fn fetch_average_ranks(
    pool: &SqlitePool,
    province: &str,
    exam_type: &str,
    recent_years: i64,
) -> Result<Vec<AdmissionRecord>> {
    let rows: Vec<(String, String, i64, Option<i64>, i64)> = sqlx::query_as(
        r#"
        SELECT school,
               major,
               CAST(ROUND(AVG(min_rank)) AS INTEGER) AS avg_rank,
               MIN(min_score) AS min_score,
               MAX(year) AS latest_year
        FROM admissions
        WHERE province = ?
          AND exam_type = ?
          AND min_rank IS NOT NULL
          AND year > (
              SELECT COALESCE(MAX(year), 0) - ?
              FROM admissions
              WHERE province = ? AND exam_type = ?
          )
        GROUP BY school, major
        "#,
    )
    .bind(province)
    .bind(exam_type)
    .bind(recent_years)
    .bind(province)
    .bind(exam_type)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(school, major, average_rank, min_score, year)| AdmissionRecord {
            school,
            major,
            province: province.to_string(),
            exam_track: exam_type.to_string(),
            year,
            average_rank,
            min_score,
        })
        .collect())
}

/// Fetch the yearly admission history of one school + major
///
/// Ordered by year ascending, rows without rank data excluded.
pub async fn fetch_history(
    pool: &SqlitePool,
    school: &str,
    major: &str,
    province: &str,
    exam_type: &str,
) -> Result<Vec<YearlyAdmission>> {
    let rows: Vec<(i64, Option<i64>, i64)> = sqlx::query_as(
        r#"
        SELECT year, min_score, min_rank
        FROM admissions
        WHERE school = ? AND major = ? AND province = ? AND exam_type = ?
          AND min_rank IS NOT NULL
        ORDER BY year ASC
        "#,
    )
    .bind(school)
    .bind(major)
    .bind(province)
    .bind(exam_type)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(year, min_score, min_rank)| YearlyAdmission {
            year,
            min_score,
            min_rank,
        })
        .collect())
}
