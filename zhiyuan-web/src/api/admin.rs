//! Administration endpoints
//!
//! All routes here sit behind the session and admin middleware; the
//! `Extension<User>` is the acting administrator.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use zhiyuan_common::db::User;

use crate::db::{announcements, users};
use crate::{api::ApiError, AppState};

/// GET /api/admin/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let list = users::list_users(&state.db).await?;
    Ok(Json(list))
}

/// DELETE /api/admin/users/:guid
///
/// Admins cannot delete themselves or other admins.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(acting): Extension<User>,
    Path(guid): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if guid == acting.guid {
        return Err(ApiError::BadRequest("cannot delete your own account".to_string()));
    }

    let target = users::find_by_guid(&state.db, &guid)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    if target.is_admin() {
        return Err(ApiError::Forbidden("cannot delete another admin".to_string()));
    }

    users::delete_user(&state.db, &guid).await?;
    info!("admin '{}' deleted user '{}'", acting.username, target.username);

    Ok(Json(json!({ "status": "deleted" })))
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub action: String,
}

/// POST /api/admin/users/:guid/role
///
/// Body `{"action": "promote"}` or `{"action": "demote"}`.
pub async fn set_user_role(
    State(state): State<AppState>,
    Extension(acting): Extension<User>,
    Path(guid): Path<String>,
    Json(req): Json<RoleRequest>,
) -> Result<Json<Value>, ApiError> {
    if guid == acting.guid {
        return Err(ApiError::BadRequest("cannot change your own role".to_string()));
    }

    let new_role = match req.action.as_str() {
        "promote" => "admin",
        "demote" => "user",
        other => {
            return Err(ApiError::BadRequest(format!("unknown action: {other}")));
        }
    };

    let updated = users::set_role(&state.db, &guid, new_role).await?;
    if !updated {
        return Err(ApiError::NotFound("user not found".to_string()));
    }

    info!("admin '{}' set role '{}' on user {}", acting.username, new_role, guid);

    Ok(Json(json!({ "status": "updated", "role": new_role })))
}

#[derive(Debug, Deserialize)]
pub struct CreateAnnouncementRequest {
    pub title: String,
    pub content: String,
    pub expire_time: Option<String>,
    #[serde(default)]
    pub is_pinned: bool,
}

/// POST /api/admin/announcements
pub async fn create_announcement(
    State(state): State<AppState>,
    Json(req): Json<CreateAnnouncementRequest>,
) -> Result<Json<Value>, ApiError> {
    let title = req.title.trim();
    if title.is_empty() || req.content.trim().is_empty() {
        return Err(ApiError::BadRequest("title and content are required".to_string()));
    }

    let guid = announcements::create(
        &state.db,
        title,
        &req.content,
        req.expire_time.as_deref(),
        req.is_pinned,
    )
    .await?;

    Ok(Json(json!({ "guid": guid, "status": "created" })))
}

/// DELETE /api/admin/announcements/:guid
pub async fn delete_announcement(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let deleted = announcements::delete(&state.db, &guid).await?;
    if !deleted {
        return Err(ApiError::NotFound("announcement not found".to_string()));
    }

    Ok(Json(json!({ "status": "deleted" })))
}
