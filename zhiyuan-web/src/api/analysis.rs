//! Rank analysis endpoint

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::analysis::{
    predict_rank, rank_trend, risk_level, volatility, volatility_level, RiskLevel, Trend,
    VolatilityLevel, YearlyAdmission,
};
use crate::db::admissions;
use crate::{api::ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct AnalysisParams {
    pub province: Option<String>,
    pub exam_type: Option<String>,
    pub student_rank: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PredictedRange {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub school: String,
    pub major: String,
    pub historical_data: Vec<YearlyAdmission>,
    pub trend: Trend,
    pub trend_description: String,
    pub predicted_rank: i64,
    pub predicted_range: PredictedRange,
    pub volatility: VolatilityLevel,
    pub volatility_value: i64,
    pub risk_assessment: Option<RiskLevel>,
}

/// GET /api/analysis/:school/:major
///
/// Returns the yearly history of a program together with trend,
/// next-year prediction and risk assessment (when `student_rank` is
/// supplied).
pub async fn school_analysis(
    State(state): State<AppState>,
    Path((school, major)): Path<(String, String)>,
    Query(params): Query<AnalysisParams>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let province = params.province.unwrap_or_else(|| "广东".to_string());
    let exam_type = params.exam_type.unwrap_or_else(|| "物理类".to_string());

    let history =
        admissions::fetch_history(&state.db, &school, &major, &province, &exam_type).await?;

    if history.is_empty() {
        return Err(ApiError::NotFound(format!(
            "no historical data for {} {}",
            school, major
        )));
    }

    let ranks: Vec<i64> = history.iter().map(|h| h.min_rank).collect();

    let (trend, trend_description) = rank_trend(&history);
    let prediction = predict_rank(&ranks);
    let volatility_value = volatility(&ranks);

    let risk_assessment = params
        .student_rank
        .map(|rank| risk_level(rank, prediction.predicted, volatility_value));

    Ok(Json(AnalysisResponse {
        school,
        major,
        historical_data: history,
        trend,
        trend_description,
        predicted_rank: prediction.predicted,
        predicted_range: PredictedRange {
            min: prediction.low,
            max: prediction.high,
        },
        volatility: volatility_level(volatility_value),
        volatility_value: volatility_value as i64,
        risk_assessment,
    }))
}
