//! False-positive filtering
//!
//! Independent re-scoring pass over found results. Each heuristic family
//! nudges the probe confidence up or down; results that land below the
//! threshold are suppressed. The threshold is configuration (default 40),
//! not a calibrated constant.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::platform::Platform;
use crate::result::ProbeResult;
use crate::{DEFAULT_FP_THRESHOLD, MAX_SCORE};

/// Path shapes that look like a real profile page
fn profile_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"/(users?|profile|u|members?|channel)/|/@\w").expect("static pattern")
    })
}

/// URL path fragments that look like anything but a profile page
const NON_PROFILE_PATH_HINTS: &[&str] = &[
    "search", "login", "register", "signup", "signin", "error", "404", "not-found",
];

/// Body keywords typical of profile pages
const PROFILE_KEYWORDS: &[&str] = &[
    "followers",
    "following",
    "posts",
    "joined",
    "member since",
    "subscribers",
    "about me",
    "bio",
];

/// Body keywords indicating sensitive exposure
const SENSITIVE_KEYWORDS: &[&str] = &["onlyfans", "escort", "cam", "nude", "leaked", "premium"];

/// Body phrases typical of error pages served with a 200
const ERROR_PHRASES: &[&str] = &[
    "page not found",
    "user not found",
    "doesn't exist",
    "does not exist",
    "no longer available",
    "error 404",
];

/// Usernames too generic to attribute to one person
const GENERIC_USERNAMES: &[&str] = &[
    "admin", "test", "user", "guest", "info", "mail", "contact", "support", "demo", "null",
];

/// Verdict of the filter for one result
#[derive(Debug, Clone)]
pub struct FilterVerdict {
    /// Adjusted confidence (0-100)
    pub confidence: u8,
    /// True when the adjusted confidence fell below the threshold
    pub is_false_positive: bool,
}

/// Heuristic re-scorer that suppresses spurious found results
#[derive(Debug, Clone, Copy)]
pub struct FalsePositiveFilter {
    threshold: u8,
}

impl Default for FalsePositiveFilter {
    fn default() -> Self {
        Self::new(DEFAULT_FP_THRESHOLD)
    }
}

impl FalsePositiveFilter {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    /// Re-score one found result
    pub fn analyze(&self, platform: &Platform, result: &ProbeResult) -> FilterVerdict {
        let mut confidence = i32::from(result.confidence);

        confidence += url_shape(&result.url);
        if let Some(snippet) = &result.body_snippet {
            confidence += content_shape(snippet);
        }
        confidence += username_shape(&result.variation);
        confidence += context(platform, result);

        let confidence = confidence.clamp(0, i32::from(MAX_SCORE)) as u8;
        FilterVerdict {
            confidence,
            is_false_positive: confidence < self.threshold,
        }
    }

    /// Apply [`analyze`](Self::analyze) to every found result and keep the
    /// survivors with their adjusted confidence.
    pub fn filter_results(
        &self,
        items: Vec<(&Platform, ProbeResult)>,
    ) -> Vec<(Platform, ProbeResult)> {
        let total = items.len();
        let mut kept = Vec::with_capacity(total);

        for (platform, mut result) in items {
            let verdict = self.analyze(platform, &result);
            if verdict.is_false_positive {
                continue;
            }
            result.confidence = verdict.confidence;
            kept.push((platform.clone(), result));
        }

        let suppressed = total - kept.len();
        if suppressed > 0 {
            debug!("False-positive filter suppressed {}/{} results", suppressed, total);
        }
        kept
    }
}

fn url_shape(url: &str) -> i32 {
    let url = url.to_lowercase();
    let mut adjustment = 0;

    if profile_path_re().is_match(&url) {
        adjustment += 8;
    }
    if NON_PROFILE_PATH_HINTS.iter().any(|hint| url.contains(hint)) {
        adjustment -= 15;
    }
    adjustment
}

fn content_shape(snippet: &str) -> i32 {
    let mut adjustment = 0;

    let profile_hits = PROFILE_KEYWORDS
        .iter()
        .filter(|k| snippet.contains(*k))
        .count() as i32;
    adjustment += (profile_hits * 4).min(15);

    let sensitive_hits = SENSITIVE_KEYWORDS
        .iter()
        .filter(|k| snippet.contains(*k))
        .count() as i32;
    adjustment += (sensitive_hits * 5).min(10);

    if ERROR_PHRASES.iter().any(|p| snippet.contains(p)) {
        adjustment -= 25;
    }
    adjustment
}

fn username_shape(variation: &str) -> i32 {
    let lowered = variation.to_lowercase();
    if variation.len() <= 3 || GENERIC_USERNAMES.contains(&lowered.as_str()) {
        -12
    } else {
        0
    }
}

fn context(platform: &Platform, result: &ProbeResult) -> i32 {
    let mut adjustment = 0;

    if platform.high_risk() {
        adjustment += 5;
    }

    let similarity = dice_coefficient(&result.original_username, &result.variation);
    if similarity >= 0.75 {
        adjustment += 8;
    } else if similarity < 0.4 {
        adjustment -= 10;
    }
    adjustment
}

/// Sørensen-Dice coefficient over character bigrams, case-insensitive
pub fn dice_coefficient(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a == b {
        return 1.0;
    }

    let bigrams = |s: &str| -> Vec<(char, char)> {
        let chars: Vec<char> = s.chars().collect();
        chars.windows(2).map(|w| (w[0], w[1])).collect()
    };

    let a_grams = bigrams(&a);
    let mut b_grams = bigrams(&b);
    if a_grams.is_empty() || b_grams.is_empty() {
        return 0.0;
    }

    let mut matches = 0usize;
    for gram in &a_grams {
        if let Some(pos) = b_grams.iter().position(|g| g == gram) {
            b_grams.swap_remove(pos);
            matches += 1;
        }
    }

    2.0 * matches as f64 / (a_grams.len() + b_grams.len() + matches) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Category, CheckType, Priority};
    use chrono::Utc;

    fn platform(priority: Priority) -> Platform {
        Platform {
            name: "Example".to_string(),
            url_template: "https://example.com/{username}".to_string(),
            category: Category::Social,
            priority,
            check_type: CheckType::Http,
            adult: false,
            urgent: false,
            requires_tor: false,
            slow: false,
            found_patterns: vec![],
            not_found_patterns: vec![],
        }
    }

    fn found(variation: &str, confidence: u8, url: &str) -> ProbeResult {
        ProbeResult {
            platform_name: "Example".to_string(),
            url: url.to_string(),
            variation: variation.to_string(),
            original_username: "alice_w".to_string(),
            found: true,
            confidence,
            matched_patterns: vec![],
            http_status: Some(200),
            error: None,
            from_cache: false,
            timestamp: Utc::now(),
            body_snippet: None,
        }
    }

    #[test]
    fn test_profile_url_raises_confidence() {
        let filter = FalsePositiveFilter::default();
        let p = platform(Priority::Medium);

        let plain = found("alice_w", 50, "https://example.com/alice_w");
        let profile = found("alice_w", 50, "https://example.com/user/alice_w");

        assert!(
            filter.analyze(&p, &profile).confidence > filter.analyze(&p, &plain).confidence
        );
    }

    #[test]
    fn test_error_page_body_suppresses() {
        let filter = FalsePositiveFilter::default();
        let p = platform(Priority::Low);

        let result = found("alice_w", 45, "https://example.com/search?q=alice_w")
            .with_body_snippet("Sorry, page not found.");

        let verdict = filter.analyze(&p, &result);
        assert!(verdict.is_false_positive);
    }

    #[test]
    fn test_generic_username_lowered() {
        let filter = FalsePositiveFilter::default();
        let p = platform(Priority::Medium);

        let generic = found("admin", 50, "https://example.com/admin");
        let specific = found("alice_w", 50, "https://example.com/alice_w");

        assert!(
            filter.analyze(&p, &specific).confidence > filter.analyze(&p, &generic).confidence
        );
    }

    #[test]
    fn test_filter_results_never_grows_and_respects_threshold() {
        let filter = FalsePositiveFilter::default();
        let p = platform(Priority::Medium);

        let items = vec![
            (&p, found("alice_w", 85, "https://example.com/user/alice_w")),
            (&p, found("zzz", 30, "https://example.com/search?q=zzz")),
            (&p, found("alice_w99", 60, "https://example.com/user/alice_w99")),
        ];
        let total = items.len();

        let kept = filter.filter_results(items);
        assert!(kept.len() <= total);
        assert!(kept.iter().all(|(_, r)| r.confidence >= DEFAULT_FP_THRESHOLD));
    }

    #[test]
    fn test_dice_coefficient() {
        assert_eq!(dice_coefficient("alice", "alice"), 1.0);
        assert_eq!(dice_coefficient("alice", "ALICE"), 1.0);
        assert!(dice_coefficient("alice", "alice1") > 0.75);
        assert!(dice_coefficient("alice", "xyzzy") < 0.2);
        assert_eq!(dice_coefficient("a", "b"), 0.0);
    }
}
