//! Recommendation endpoint

use axum::{extract::State, Form, Json};
use serde::{Deserialize, Serialize};
use zhiyuan_common::db::setting_i64;

use crate::db::admissions;
use crate::engine::{self, EngineError, RecommendationQuery, ScoredRecord};
use crate::{api::ApiError, AppState};

/// Request parameters, form-encoded (POST) or query string (GET)
///
/// `rank` arrives as text so a malformed value maps to 400 rather than
/// an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    pub rank: String,
    pub province: String,
    pub exam_type: String,
}

/// One recommended program on the wire
#[derive(Debug, Serialize)]
pub struct RecommendedProgram {
    pub school: String,
    pub major: String,
    pub avg_rank: i64,
    pub min_score: Option<i64>,
    pub probability: u8,
}

impl From<ScoredRecord> for RecommendedProgram {
    fn from(scored: ScoredRecord) -> Self {
        RecommendedProgram {
            school: scored.record.school,
            major: scored.record.major,
            avg_rank: scored.record.average_rank,
            min_score: scored.record.min_score,
            probability: scored.probability,
        }
    }
}

/// Tier-bucketed response: exactly the three tier keys
#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub reach: Vec<RecommendedProgram>,
    #[serde(rename = "match")]
    pub matches: Vec<RecommendedProgram>,
    pub safety: Vec<RecommendedProgram>,
}

/// POST (form) / GET (query) /api/recommend
pub async fn recommend(
    State(state): State<AppState>,
    Form(params): Form<RecommendParams>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let rank: i64 = params
        .rank
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest("rank must be a whole number".to_string()))?;

    let recent_years = setting_i64(&state.db, "recommend_recent_years", 3).await?;
    let limit = setting_i64(&state.db, "recommend_limit_per_tier", 0).await?;

    let query = RecommendationQuery {
        rank,
        province: params.province.trim().to_string(),
        exam_track: params.exam_type.trim().to_string(),
        limit_per_tier: if limit > 0 { Some(limit as usize) } else { None },
    };

    let candidates =
        admissions::fetch_average_ranks(&state.db, &query.province, &query.exam_track, recent_years)
            .await?;

    let result = engine::recommend(&query, candidates).map_err(|e| match e {
        EngineError::InvalidQuery(msg) => ApiError::BadRequest(msg),
    })?;

    Ok(Json(RecommendResponse {
        reach: result.reach.into_iter().map(Into::into).collect(),
        matches: result.matches.into_iter().map(Into::into).collect(),
        safety: result.safety.into_iter().map(Into::into).collect(),
    }))
}
