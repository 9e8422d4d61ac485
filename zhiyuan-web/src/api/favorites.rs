//! Wishlist endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use zhiyuan_common::db::{Favorite, User};

use crate::db::{favorites, is_unique_violation};
use crate::engine::Tier;
use crate::{api::ApiError, AppState};

fn parse_category(value: &str) -> Option<Tier> {
    match value {
        "reach" => Some(Tier::Reach),
        "match" => Some(Tier::Match),
        "safety" => Some(Tier::Safety),
        _ => None,
    }
}

/// GET /api/favorites
pub async fn list_favorites(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Favorite>>, ApiError> {
    let items = favorites::list_for_user(&state.db, &user.guid).await?;
    Ok(Json(items))
}

#[derive(Debug, Deserialize)]
pub struct CreateFavoriteRequest {
    pub school: String,
    pub major: String,
    pub category: Option<String>,
    pub note: Option<String>,
}

/// POST /api/favorites
///
/// An unknown category silently falls back to `match` rather than
/// failing the save.
pub async fn create_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<CreateFavoriteRequest>,
) -> Result<Json<Value>, ApiError> {
    let school = req.school.trim();
    let major = req.major.trim();

    if school.is_empty() || major.is_empty() {
        return Err(ApiError::BadRequest(
            "school and major must not be empty".to_string(),
        ));
    }

    let category = req
        .category
        .as_deref()
        .and_then(parse_category)
        .unwrap_or(Tier::Match);

    match favorites::insert(
        &state.db,
        &user.guid,
        school,
        major,
        category.as_str(),
        req.note.as_deref(),
    )
    .await
    {
        Ok(guid) => Ok(Json(json!({ "guid": guid, "status": "created" }))),
        Err(zhiyuan_common::Error::Database(e)) if is_unique_violation(&e) => Err(
            ApiError::Conflict("this school and major is already on the wishlist".to_string()),
        ),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /api/favorites/:guid
pub async fn delete_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(guid): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let deleted = favorites::delete(&state.db, &user.guid, &guid).await?;
    if !deleted {
        return Err(ApiError::NotFound("wishlist entry not found".to_string()));
    }

    Ok(Json(json!({ "status": "deleted" })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateFavoriteRequest {
    pub category: Option<String>,
    pub note: Option<String>,
}

/// PUT /api/favorites/:guid
///
/// Unlike creation, an explicit bad category here is an error.
pub async fn update_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(guid): Path<String>,
    Json(req): Json<UpdateFavoriteRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.category.is_none() && req.note.is_none() {
        return Err(ApiError::BadRequest(
            "at least one of category or note is required".to_string(),
        ));
    }

    let category = match req.category.as_deref() {
        Some(value) => Some(
            parse_category(value)
                .ok_or_else(|| ApiError::BadRequest(format!("invalid category: {value}")))?,
        ),
        None => None,
    };

    let updated = favorites::update(
        &state.db,
        &user.guid,
        &guid,
        category.map(|c| c.as_str()),
        req.note.as_deref(),
    )
    .await?;

    if !updated {
        return Err(ApiError::NotFound("wishlist entry not found".to_string()));
    }

    Ok(Json(json!({ "status": "updated" })))
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub ordered_guids: Vec<String>,
}

/// POST /api/favorites/reorder
pub async fn reorder_favorites(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.ordered_guids.is_empty() {
        return Err(ApiError::BadRequest("ordered_guids must not be empty".to_string()));
    }

    favorites::reorder(&state.db, &user.guid, &req.ordered_guids).await?;

    Ok(Json(json!({ "status": "reordered" })))
}
