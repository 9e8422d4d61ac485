//! Public announcement endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use zhiyuan_common::db::{setting_i64, Announcement};

use crate::db::announcements;
use crate::{api::ApiError, AppState};

/// Characters kept when summarizing announcement content
const SUMMARY_LEN: usize = 45;

/// GET /api/announcements
///
/// All unexpired announcements, pinned first.
pub async fn list_announcements(
    State(state): State<AppState>,
) -> Result<Json<Vec<Announcement>>, ApiError> {
    let items = announcements::list_active(&state.db).await?;
    Ok(Json(items))
}

/// Compact announcement for the landing page
#[derive(Debug, Serialize)]
pub struct AnnouncementSummary {
    pub guid: String,
    pub title: String,
    pub summary: String,
    pub is_pinned: bool,
}

/// Reduce announcement markup to a short plain-text preview
///
/// Truncation counts characters, not bytes, so multi-byte content never
/// splits mid-character.
pub fn summarize(content: &str) -> String {
    content
        .replace("<br>", " ")
        .replace("</p>", " ")
        .chars()
        .take(SUMMARY_LEN)
        .collect()
}

/// GET /api/announcements/latest
///
/// The newest few announcements with summarized content.
pub async fn latest_announcements(
    State(state): State<AppState>,
) -> Result<Json<Vec<AnnouncementSummary>>, ApiError> {
    let count = setting_i64(&state.db, "announcements_latest_count", 3).await?;
    let items = announcements::latest(&state.db, count).await?;

    Ok(Json(
        items
            .into_iter()
            .map(|a| AnnouncementSummary {
                guid: a.guid,
                title: a.title,
                summary: summarize(&a.content),
                is_pinned: a.is_pinned,
            })
            .collect(),
    ))
}
