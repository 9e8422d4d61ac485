//! Tiered recommendation engine
//!
//! Classifies historical admission programs into reach/match/safety tiers
//! relative to a candidate's exam rank and attaches an admission
//! probability estimate to each.
//!
//! The probability is a linear heuristic, not a calibrated statistical
//! model: at a gap ratio of zero it reports 50%, and every percentage
//! point of relative rank distance moves it by one point, saturating at
//! 0 and 100.
//!
//! The engine is a pure function of its inputs. It performs no I/O and
//! holds no state, so it is safe to call concurrently.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Half-width of the "match" band around the historical average rank
pub const TIER_BAND: f64 = 0.10;

/// Competitiveness tier of a program relative to the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Historical cohort admitted at a better rank than the candidate
    Reach,
    /// Candidate rank within the band around the historical average
    Match,
    /// Candidate rank comfortably better than needed historically
    Safety,
}

impl Tier {
    /// Classify a signed relative rank gap into a tier
    ///
    /// Rank numbers grow toward worse performance, so a negative gap
    /// means the historical cohort out-ranked the candidate. Both band
    /// edges belong to `Match`.
    ///
    /// # Examples
    ///
    /// ```
    /// use zhiyuan_web::engine::Tier;
    ///
    /// assert_eq!(Tier::classify(-0.25), Tier::Reach);
    /// assert_eq!(Tier::classify(-0.10), Tier::Match);
    /// assert_eq!(Tier::classify(0.10), Tier::Match);
    /// assert_eq!(Tier::classify(0.5), Tier::Safety);
    /// ```
    pub fn classify(gap_ratio: f64) -> Tier {
        if gap_ratio < -TIER_BAND {
            Tier::Reach
        } else if gap_ratio <= TIER_BAND {
            Tier::Match
        } else {
            Tier::Safety
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Reach => "reach",
            Tier::Match => "match",
            Tier::Safety => "safety",
        }
    }
}

/// One historical admission statistic, aggregated per school + major
///
/// Produced by the storage layer; the engine never queries the database
/// itself.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionRecord {
    pub school: String,
    pub major: String,
    pub province: String,
    pub exam_track: String,
    /// Latest year contributing to the aggregate
    pub year: i64,
    /// Historical average admitted rank; must be positive to be scored
    pub average_rank: i64,
    pub min_score: Option<i64>,
}

/// A candidate's recommendation request
#[derive(Debug, Clone)]
pub struct RecommendationQuery {
    /// Province-wide exam rank; lower is better
    pub rank: i64,
    pub province: String,
    pub exam_track: String,
    /// Bound on results per tier; `None` = unlimited
    pub limit_per_tier: Option<usize>,
}

/// An admission record with its computed probability
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: AdmissionRecord,
    /// Estimated admission probability in percent, 0-100
    pub probability: u8,
}

/// Tier-bucketed, ordered recommendation output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationResult {
    pub reach: Vec<ScoredRecord>,
    pub matches: Vec<ScoredRecord>,
    pub safety: Vec<ScoredRecord>,
}

impl RecommendationResult {
    /// Total number of scored records across all tiers
    pub fn len(&self) -> usize {
        self.reach.len() + self.matches.len() + self.safety.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Engine failure conditions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed query; distinguishable from a valid query with no data
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Signed relative distance between the candidate's rank and a
/// program's historical average rank
///
/// Positive when the candidate's rank number is worse (higher) than the
/// historical average, negative when better.
pub fn gap_ratio(query_rank: i64, average_rank: i64) -> f64 {
    (query_rank - average_rank) as f64 / average_rank as f64
}

/// Admission probability for a given gap ratio, clamped to [0, 100]
///
/// # Examples
///
/// ```
/// use zhiyuan_web::engine::admission_probability;
///
/// assert_eq!(admission_probability(0.0), 50);
/// assert_eq!(admission_probability(0.25), 25);
/// assert_eq!(admission_probability(-0.30), 80);
/// assert_eq!(admission_probability(2.0), 0);
/// assert_eq!(admission_probability(-1.0), 100);
/// ```
pub fn admission_probability(gap_ratio: f64) -> u8 {
    let raw = (50.0 - 100.0 * gap_ratio).round();
    raw.clamp(0.0, 100.0) as u8
}

/// Classify and score candidate programs for one query
///
/// Candidates are expected to be pre-filtered to the query's province
/// and exam track; records that disagree anyway are skipped rather than
/// misclassified, as are records without a positive average rank.
///
/// Within each tier, results are ordered by probability descending,
/// then average rank ascending (more selective programs first), then
/// school name, so identical inputs always produce identical output.
pub fn recommend(
    query: &RecommendationQuery,
    candidates: Vec<AdmissionRecord>,
) -> Result<RecommendationResult, EngineError> {
    if query.rank <= 0 {
        return Err(EngineError::InvalidQuery(format!(
            "rank must be a positive integer, got {}",
            query.rank
        )));
    }
    if query.province.trim().is_empty() {
        return Err(EngineError::InvalidQuery("province must not be empty".to_string()));
    }
    if query.exam_track.trim().is_empty() {
        return Err(EngineError::InvalidQuery("exam track must not be empty".to_string()));
    }

    let mut result = RecommendationResult::default();

    for record in candidates {
        // Rows without usable rank data cannot be scored
        if record.average_rank <= 0 {
            continue;
        }
        // Guard against an unfiltered caller
        if record.province != query.province || record.exam_track != query.exam_track {
            continue;
        }

        let gap = gap_ratio(query.rank, record.average_rank);
        let scored = ScoredRecord {
            probability: admission_probability(gap),
            record,
        };

        match Tier::classify(gap) {
            Tier::Reach => result.reach.push(scored),
            Tier::Match => result.matches.push(scored),
            Tier::Safety => result.safety.push(scored),
        }
    }

    for tier in [&mut result.reach, &mut result.matches, &mut result.safety] {
        tier.sort_by(|a, b| {
            b.probability
                .cmp(&a.probability)
                .then_with(|| a.record.average_rank.cmp(&b.record.average_rank))
                .then_with(|| a.record.school.cmp(&b.record.school))
        });
        if let Some(limit) = query.limit_per_tier {
            tier.truncate(limit);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(school: &str, average_rank: i64) -> AdmissionRecord {
        AdmissionRecord {
            school: school.to_string(),
            major: "计算机科学与技术".to_string(),
            province: "广东".to_string(),
            exam_track: "物理类".to_string(),
            year: 2024,
            average_rank,
            min_score: Some(620),
        }
    }

    fn query(rank: i64) -> RecommendationQuery {
        RecommendationQuery {
            rank,
            province: "广东".to_string(),
            exam_track: "物理类".to_string(),
            limit_per_tier: None,
        }
    }

    #[test]
    fn test_tier_partition_is_total_and_disjoint() {
        let candidates: Vec<AdmissionRecord> = (1..=20)
            .map(|i| record(&format!("school-{i:02}"), i * 1000))
            .collect();

        let result = recommend(&query(10000), candidates).unwrap();

        // Every scorable candidate lands in exactly one tier
        assert_eq!(result.len(), 20);

        let mut seen: Vec<&str> = result
            .reach
            .iter()
            .chain(result.matches.iter())
            .chain(result.safety.iter())
            .map(|s| s.record.school.as_str())
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 20);
    }

    #[test]
    fn test_probability_bounds() {
        for rank in [1, 500, 10000, 1_000_000] {
            let candidates = vec![record("a", 1), record("b", 5000), record("c", 900_000)];
            let result = recommend(&query(rank), candidates).unwrap();
            for scored in result.reach.iter().chain(&result.matches).chain(&result.safety) {
                assert!(scored.probability <= 100);
            }
        }
    }

    #[test]
    fn test_probability_monotonic_in_query_rank() {
        // Worsening (increasing) the query rank against a fixed program
        // never raises the estimate
        let mut last = 100u8;
        for rank in (1000..20000).step_by(500) {
            let result = recommend(&query(rank), vec![record("a", 10000)]).unwrap();
            let scored = result
                .reach
                .iter()
                .chain(&result.matches)
                .chain(&result.safety)
                .next()
                .unwrap();
            assert!(scored.probability <= last, "probability rose at rank {rank}");
            last = scored.probability;
        }
    }

    #[test]
    fn test_boundary_exactness() {
        // gap_ratio = -0.10 exactly: still a match (band edges inclusive)
        let result = recommend(&query(9000), vec![record("edge", 10000)]).unwrap();
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].probability, 60);

        // gap_ratio = -0.11: a reach
        let result = recommend(&query(8900), vec![record("edge", 10000)]).unwrap();
        assert_eq!(result.reach.len(), 1);

        // gap_ratio = +0.10 exactly: still a match
        let result = recommend(&query(11000), vec![record("edge", 10000)]).unwrap();
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].probability, 40);

        // One rank past the band: a safety
        let result = recommend(&query(11001), vec![record("edge", 10000)]).unwrap();
        assert_eq!(result.safety.len(), 1);
    }

    #[test]
    fn test_deterministic_output() {
        let candidates: Vec<AdmissionRecord> = (1..=30)
            .map(|i| record(&format!("school-{:02}", i % 7), 3000 + (i * 137) % 9000))
            .collect();

        let a = recommend(&query(6000), candidates.clone()).unwrap();
        let b = recommend(&query(6000), candidates).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_candidates_is_not_an_error() {
        let result = recommend(&query(5000), Vec::new()).unwrap();
        assert!(result.reach.is_empty());
        assert!(result.matches.is_empty());
        assert!(result.safety.is_empty());
    }

    #[test]
    fn test_invalid_rank_rejected() {
        let err = recommend(&query(0), vec![record("a", 5000)]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuery(_)));

        let err = recommend(&query(-3), Vec::new()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuery(_)));
    }

    #[test]
    fn test_empty_province_or_track_rejected() {
        let mut q = query(5000);
        q.province = "  ".to_string();
        assert!(recommend(&q, Vec::new()).is_err());

        let mut q = query(5000);
        q.exam_track = String::new();
        assert!(recommend(&q, Vec::new()).is_err());
    }

    #[test]
    fn test_zero_average_rank_excluded() {
        let result = recommend(&query(5000), vec![record("broken", 0), record("ok", 5000)]).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.matches[0].record.school, "ok");
    }

    #[test]
    fn test_mismatched_province_skipped() {
        let mut foreign = record("elsewhere", 5000);
        foreign.province = "湖南".to_string();

        let result = recommend(&query(5000), vec![foreign, record("local", 5000)]).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.matches[0].record.school, "local");
    }

    #[test]
    fn test_tier_ordering() {
        // Same tier (safety), distinct probabilities: higher first
        let result = recommend(
            &query(10000),
            vec![record("far", 4500), record("near", 8500)],
        )
        .unwrap();
        assert_eq!(result.safety[0].record.school, "near");
        assert_eq!(result.safety[1].record.school, "far");

        // Probability tie: lower average rank first, then school name
        let result = recommend(
            &query(100_000),
            vec![record("b", 5000), record("a", 5000), record("c", 4000)],
        )
        .unwrap();
        let schools: Vec<&str> =
            result.safety.iter().map(|s| s.record.school.as_str()).collect();
        assert_eq!(schools, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_limit_per_tier() {
        let candidates: Vec<AdmissionRecord> = (1..=10)
            .map(|i| record(&format!("s{i}"), 40000 + i))
            .collect();

        let mut q = query(100_000);
        q.limit_per_tier = Some(4);

        let result = recommend(&q, candidates).unwrap();
        assert_eq!(result.safety.len(), 4);
    }

    #[test]
    fn test_example_scenario() {
        // rank 10000 vs 中山大学 avg 4500: gap ≈ 1.222, safety tier,
        // probability saturates at 0
        let result = recommend(&query(10000), vec![record("中山大学", 4500)]).unwrap();
        assert_eq!(result.safety.len(), 1);
        assert_eq!(result.safety[0].probability, 0);
        assert!(result.reach.is_empty());
        assert!(result.matches.is_empty());
    }
}
