//! Batch insertion with duplicate skipping

use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;
use zhiyuan_common::Result;

use crate::reader::CsvRow;

/// Outcome counts of one import run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ImportStats {
    pub fn total(&self) -> usize {
        self.imported + self.skipped + self.failed
    }
}

/// Insert validated rows, skipping records already present
///
/// A record is a duplicate when (province, exam_type, year, school,
/// major) already exists; existing data is never overwritten. Failures
/// are counted per row and do not abort the run.
pub async fn import_rows(pool: &SqlitePool, rows: &[CsvRow]) -> Result<ImportStats> {
    let mut stats = ImportStats::default();

    for row in rows {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM admissions
                WHERE province = ? AND exam_type = ? AND year = ?
                  AND school = ? AND major = ?
            )
            "#,
        )
        .bind(&row.province)
        .bind(&row.exam_type)
        .bind(row.year)
        .bind(&row.school)
        .bind(&row.major)
        .fetch_one(pool)
        .await?;

        if exists {
            stats.skipped += 1;
            continue;
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO admissions (guid, province, exam_type, year, school, major, min_score, min_rank)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&row.province)
        .bind(&row.exam_type)
        .bind(row.year)
        .bind(&row.school)
        .bind(&row.major)
        .bind(row.min_score)
        .bind(row.min_rank)
        .execute(pool)
        .await;

        match inserted {
            Ok(_) => stats.imported += 1,
            Err(e) => {
                warn!("failed to import {} {}: {}", row.school, row.major, e);
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}
