//! Historical rank analysis
//!
//! Turns the yearly admission history of one school + major into a
//! trend judgement, a next-year rank prediction with a confidence
//! interval, and a volatility/risk assessment. All functions are pure;
//! the storage layer supplies the history rows.

use serde::{Deserialize, Serialize};

/// One year of admission history for a school + major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyAdmission {
    pub year: i64,
    pub min_score: Option<i64>,
    pub min_rank: i64,
}

/// Direction the admission rank has been moving
///
/// "Rising" means the admitted rank numbers are shrinking year over
/// year, i.e. competition is intensifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

/// Predicted rank for the coming year with a confidence interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankPrediction {
    pub predicted: i64,
    pub low: i64,
    pub high: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Yearly rank change (in rank positions) below which the trend is
/// considered stable
const TREND_SLOPE_THRESHOLD: f64 = 100.0;

/// Confidence interval half-width in standard deviations
const CONFIDENCE_FACTOR: f64 = 1.5;

/// Least-squares slope and intercept of ranks over year index
///
/// Returns `None` when fewer than two points exist.
fn least_squares(ranks: &[i64]) -> Option<(f64, f64)> {
    let n = ranks.len();
    if n < 2 {
        return None;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = ranks.iter().sum::<i64>() as f64 / n as f64;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, &y) in ranks.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (y as f64 - y_mean);
        denominator += dx * dx;
    }
    if denominator == 0.0 {
        return None;
    }

    let slope = numerator / denominator;
    Some((slope, y_mean - slope * x_mean))
}

/// Judge the rank trend over the given history
pub fn rank_trend(history: &[YearlyAdmission]) -> (Trend, String) {
    if history.len() < 2 {
        return (
            Trend::Stable,
            "Not enough history to judge a trend".to_string(),
        );
    }

    let ranks: Vec<i64> = history.iter().map(|h| h.min_rank).collect();
    let n = ranks.len();

    let slope = match least_squares(&ranks) {
        Some((slope, _)) => slope,
        None => return (Trend::Stable, "Admission rank has held steady".to_string()),
    };

    if slope < -TREND_SLOPE_THRESHOLD {
        (
            Trend::Rising,
            format!("Admission rank has climbed over the past {n} years; competition is intensifying"),
        )
    } else if slope > TREND_SLOPE_THRESHOLD {
        (
            Trend::Falling,
            format!("Admission rank has slipped over the past {n} years; competition is easing"),
        )
    } else {
        (
            Trend::Stable,
            format!("Admission rank has stayed roughly stable over the past {n} years"),
        )
    }
}

/// Predict next year's rank from the historical ranks (time order)
///
/// Linear extrapolation one step past the last observation, with a
/// ±1.5 standard deviation interval. Ranks never go below 1.
pub fn predict_rank(ranks: &[i64]) -> RankPrediction {
    match ranks.len() {
        0 => {
            return RankPrediction {
                predicted: 0,
                low: 0,
                high: 0,
            }
        }
        1 => {
            return RankPrediction {
                predicted: ranks[0],
                low: ranks[0],
                high: ranks[0],
            }
        }
        _ => {}
    }

    let interval = CONFIDENCE_FACTOR * volatility(ranks);

    let predicted = match least_squares(ranks) {
        Some((slope, intercept)) => slope * ranks.len() as f64 + intercept,
        // Degenerate fit: fall back to the mean
        None => ranks.iter().sum::<i64>() as f64 / ranks.len() as f64,
    };

    RankPrediction {
        predicted: (predicted as i64).max(1),
        low: ((predicted - interval) as i64).max(1),
        high: (predicted + interval) as i64,
    }
}

/// Sample standard deviation of the ranks; 0.0 below two samples
pub fn volatility(ranks: &[i64]) -> f64 {
    let n = ranks.len();
    if n < 2 {
        return 0.0;
    }

    let mean = ranks.iter().sum::<i64>() as f64 / n as f64;
    let sum_sq: f64 = ranks.iter().map(|&r| (r as f64 - mean).powi(2)).sum();
    (sum_sq / (n - 1) as f64).sqrt()
}

/// Bucket a volatility value into a coarse level
pub fn volatility_level(volatility: f64) -> VolatilityLevel {
    if volatility < 300.0 {
        VolatilityLevel::Low
    } else if volatility < 800.0 {
        VolatilityLevel::Medium
    } else {
        VolatilityLevel::High
    }
}

/// Assess admission risk for a student against a predicted rank
///
/// Inside the prediction interval is medium risk; ranked better than
/// the lower bound is low risk; worse than the upper bound is high.
pub fn risk_level(student_rank: i64, predicted_rank: i64, volatility: f64) -> RiskLevel {
    let predicted_min = predicted_rank as f64 - CONFIDENCE_FACTOR * volatility;
    let predicted_max = predicted_rank as f64 + CONFIDENCE_FACTOR * volatility;

    if (student_rank as f64) < predicted_min {
        RiskLevel::Low
    } else if student_rank as f64 <= predicted_max {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}
