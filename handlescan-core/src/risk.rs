//! Risk scoring
//!
//! Converts a positive probe into a 0-100 severity estimate: a weighted sum
//! of five factors, each normalized to [0, 1] before weighting. The weights
//! are configuration, not constants - no calibration is baked in.

use crate::platform::Platform;
use crate::result::ProbeResult;
use crate::MAX_SCORE;

/// Per-factor weights. The defaults sum to 100, making the weighted sum
/// land directly on the 0-100 scale.
#[derive(Debug, Clone, Copy)]
pub struct RiskWeights {
    /// Platform priority tier (urgent platforms override to maximum)
    pub platform: f64,
    /// Probe confidence
    pub confidence: f64,
    /// Strength of content-pattern matches
    pub content_match: f64,
    /// Similarity between the matched variation and the original username
    pub username_match: f64,
    /// Platform category exposure
    pub category: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            platform: 30.0,
            confidence: 25.0,
            username_match: 20.0,
            content_match: 15.0,
            category: 10.0,
        }
    }
}

/// Scores positive probes on the 0-100 risk scale
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer {
    weights: RiskWeights,
}

impl RiskScorer {
    pub fn new(weights: RiskWeights) -> Self {
        Self { weights }
    }

    /// Risk score for a probe result. Not-found and structurally invalid
    /// results always score zero.
    pub fn calculate_risk(&self, platform: &Platform, result: &ProbeResult) -> u8 {
        if !result.found || result.variation.is_empty() || result.original_username.is_empty() {
            return 0;
        }

        let platform_factor = if platform.urgent {
            1.0
        } else {
            platform.priority.weight()
        };
        let confidence_factor = f64::from(result.confidence.min(MAX_SCORE)) / 100.0;
        let content_factor = (result.matched_patterns.len() as f64 * 0.25).min(1.0);
        let username_factor = username_match(&result.original_username, &result.variation);
        let category_factor = platform.category.risk_weight();

        let w = &self.weights;
        let score = platform_factor * w.platform
            + confidence_factor * w.confidence
            + content_factor * w.content_match
            + username_factor * w.username_match
            + category_factor * w.category;

        score.round().clamp(0.0, f64::from(MAX_SCORE)) as u8
    }
}

/// How strongly a matched variation points back at the original username:
/// 1.0 for an exact match, at least 0.7 when the variation contains the
/// original, otherwise decaying with the length delta.
fn username_match(original: &str, variation: &str) -> f64 {
    if variation == original {
        return 1.0;
    }

    let orig_lower = original.to_lowercase();
    let var_lower = variation.to_lowercase();
    if var_lower == orig_lower {
        return 0.95;
    }
    if var_lower.contains(&orig_lower) {
        // Tighter variations (smaller affix) score closer to exact
        let extra = variation.len().saturating_sub(original.len()) as f64;
        return (1.0 - extra * 0.03).max(0.7);
    }

    let delta = (variation.len() as f64 - original.len() as f64).abs();
    let base = original.len().max(1) as f64;
    (0.6 - delta / base * 0.3).max(0.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Category, CheckType, Priority};
    use chrono::Utc;

    fn platform(priority: Priority, category: Category, urgent: bool) -> Platform {
        Platform {
            name: "Example".to_string(),
            url_template: "https://example.com/{username}".to_string(),
            category,
            priority,
            check_type: CheckType::Http,
            adult: false,
            urgent,
            requires_tor: false,
            slow: false,
            found_patterns: vec![],
            not_found_patterns: vec![],
        }
    }

    fn found_result(confidence: u8, patterns: usize) -> ProbeResult {
        ProbeResult {
            platform_name: "Example".to_string(),
            url: "https://example.com/alice".to_string(),
            variation: "alice".to_string(),
            original_username: "alice".to_string(),
            found: true,
            confidence,
            matched_patterns: (0..patterns).map(|i| format!("p{i}")).collect(),
            http_status: Some(200),
            error: None,
            from_cache: false,
            timestamp: Utc::now(),
            body_snippet: None,
        }
    }

    #[test]
    fn test_not_found_scores_zero() {
        let scorer = RiskScorer::default();
        let mut result = found_result(90, 3);
        result.found = false;

        let p = platform(Priority::Critical, Category::Adult, true);
        assert_eq!(scorer.calculate_risk(&p, &result), 0);
    }

    #[test]
    fn test_invalid_result_scores_zero() {
        let scorer = RiskScorer::default();
        let mut result = found_result(90, 3);
        result.variation = String::new();

        let p = platform(Priority::Critical, Category::Adult, false);
        assert_eq!(scorer.calculate_risk(&p, &result), 0);
    }

    #[test]
    fn test_monotonic_in_confidence() {
        let scorer = RiskScorer::default();
        let p = platform(Priority::Medium, Category::Social, false);

        let mut previous = 0;
        for confidence in [10, 30, 50, 70, 90] {
            let score = scorer.calculate_risk(&p, &found_result(confidence, 1));
            assert!(score >= previous);
            previous = score;
        }
    }

    #[test]
    fn test_urgent_overrides_priority_tier() {
        let scorer = RiskScorer::default();
        let result = found_result(70, 1);

        let calm = scorer.calculate_risk(&platform(Priority::Low, Category::Social, false), &result);
        let urgent = scorer.calculate_risk(&platform(Priority::Low, Category::Social, true), &result);
        assert!(urgent > calm);
    }

    #[test]
    fn test_adult_category_outranks_professional() {
        let scorer = RiskScorer::default();
        let result = found_result(70, 1);

        let adult = scorer.calculate_risk(&platform(Priority::High, Category::Adult, false), &result);
        let pro =
            scorer.calculate_risk(&platform(Priority::High, Category::Professional, false), &result);
        assert!(adult > pro);
    }

    #[test]
    fn test_username_match_ordering() {
        assert_eq!(username_match("alice", "alice"), 1.0);
        assert!(username_match("alice", "alice99") >= 0.7);
        assert!(username_match("alice", "alice99") > username_match("alice", "xyz"));
    }

    #[test]
    fn test_score_bounded() {
        let scorer = RiskScorer::default();
        let p = platform(Priority::Critical, Category::Adult, true);
        let score = scorer.calculate_risk(&p, &found_result(100, 10));
        assert!(score <= 100);
    }
}
