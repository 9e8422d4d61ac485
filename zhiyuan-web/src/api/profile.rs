//! Per-user profile endpoints

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use zhiyuan_common::db::{User, UserProfile};

use crate::db::profiles;
use crate::{api::ApiError, AppState};

/// GET /api/profile
///
/// Returns the caller's saved defaults, creating them on first access.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = profiles::get_or_create(&state.db, &user.guid).await?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub province: String,
    pub exam_type: String,
    pub rank: i64,
}

/// PUT /api/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, ApiError> {
    let province = req.province.trim();
    let exam_type = req.exam_type.trim();

    if province.is_empty() || exam_type.is_empty() {
        return Err(ApiError::BadRequest(
            "province and exam_type must not be empty".to_string(),
        ));
    }

    let profile = UserProfile {
        province: province.to_string(),
        exam_type: exam_type.to_string(),
        last_rank: req.rank.max(1),
    };

    profiles::upsert(&state.db, &user.guid, &profile).await?;

    Ok(Json(json!({ "status": "updated" })))
}
