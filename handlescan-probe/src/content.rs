//! Content probe
//!
//! Fetches the profile page and classifies the body against the platform's
//! found/not-found pattern lists, supplemented by generic fallback
//! vocabularies. Status codes only break ties.

use async_trait::async_trait;
use tracing::debug;

use handlescan_core::{Platform, ProbeResult};

use crate::client::{create_client, ProbeError};
use crate::strategy::{CheckStrategy, ProbeContext};

/// Fallback markers for absent profiles, used when a platform supplies no
/// not-found patterns of its own
const GENERIC_NOT_FOUND: &[&str] = &[
    "page not found",
    "user not found",
    "doesn't exist",
    "does not exist",
    "no such user",
    "404",
];

/// Fallback markers for present profiles
const GENERIC_FOUND: &[&str] = &["followers", "joined", "posts", "member since", "profile"];

/// Body-classification verdict
#[derive(Debug, Clone)]
pub(crate) struct ContentVerdict {
    pub found: bool,
    pub confidence: u8,
    pub matched_patterns: Vec<String>,
}

/// Classify a body against pattern lists.
/// Not-found-only: definitive absence. Found-only: presence scaling with
/// match count. Both: ambiguous page, leans absent. Neither: fall back to
/// the status code at low confidence.
pub(crate) fn classify_content(
    body_lower: &str,
    platform: &Platform,
    http_status: u16,
) -> ContentVerdict {
    let not_found_hits = match_patterns(body_lower, &platform.not_found_patterns, GENERIC_NOT_FOUND);
    let found_hits = match_patterns(body_lower, &platform.found_patterns, GENERIC_FOUND);

    match (not_found_hits.is_empty(), found_hits.is_empty()) {
        // Only absence markers
        (false, true) => ContentVerdict {
            found: false,
            confidence: 85,
            matched_patterns: not_found_hits,
        },
        // Only presence markers; confidence grows with match count
        (true, false) => {
            let bonus = (found_hits.len() * 2).min(15) as u8;
            ContentVerdict {
                found: true,
                confidence: 80 + bonus,
                matched_patterns: found_hits,
            }
        }
        // Both: ambiguous page, lean absent
        (false, false) => ContentVerdict {
            found: false,
            confidence: 60,
            matched_patterns: not_found_hits,
        },
        // Neither: the status code is all we have
        (true, true) => ContentVerdict {
            found: http_status == 200,
            confidence: 40,
            matched_patterns: Vec::new(),
        },
    }
}

/// Case-insensitive substring matches; the platform's own patterns take
/// precedence, generic fallbacks apply only when the platform supplies none.
fn match_patterns(body_lower: &str, platform_patterns: &[String], generic: &[&str]) -> Vec<String> {
    if platform_patterns.is_empty() {
        generic
            .iter()
            .filter(|p| body_lower.contains(*p))
            .map(|p| p.to_string())
            .collect()
    } else {
        platform_patterns
            .iter()
            .filter(|p| body_lower.contains(&p.to_lowercase()))
            .cloned()
            .collect()
    }
}

/// GET-and-classify body probe
pub struct ContentProbe;

#[async_trait]
impl CheckStrategy for ContentProbe {
    fn name(&self) -> &'static str {
        "content"
    }

    async fn check(
        &self,
        platform: &Platform,
        variation: &str,
        original_username: &str,
        ctx: &ProbeContext,
    ) -> Result<ProbeResult, ProbeError> {
        let url = platform.profile_url(variation);
        let timeout = ctx.http.timeout_for(platform.slow);
        let client = create_client(&ctx.http, platform.requires_tor, timeout)?;

        let response = match client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("GET {} failed: {}", url, e);
                return Ok(ProbeResult::error(
                    platform,
                    variation,
                    original_username,
                    e.to_string(),
                    ctx.now(),
                ));
            }
        };

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let body_lower = body.to_lowercase();
        let verdict = classify_content(&body_lower, platform, status);

        Ok(ProbeResult {
            platform_name: platform.name.clone(),
            url,
            variation: variation.to_string(),
            original_username: original_username.to_string(),
            found: verdict.found,
            confidence: verdict.confidence,
            matched_patterns: verdict.matched_patterns,
            http_status: Some(status),
            error: None,
            from_cache: false,
            timestamp: ctx.now(),
            body_snippet: None,
        }
        .with_body_snippet(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handlescan_core::{Category, CheckType, Priority};

    fn platform(found: &[&str], not_found: &[&str]) -> Platform {
        Platform {
            name: "Example".to_string(),
            url_template: "https://example.com/{username}".to_string(),
            category: Category::Social,
            priority: Priority::Medium,
            check_type: CheckType::Content,
            adult: false,
            urgent: false,
            requires_tor: false,
            slow: false,
            found_patterns: found.iter().map(|s| s.to_string()).collect(),
            not_found_patterns: not_found.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_not_found_patterns_only() {
        let p = platform(&["Followers"], &["This account does not exist"]);
        let verdict = classify_content("sorry, this account does not exist.", &p, 200);

        assert!(!verdict.found);
        assert_eq!(verdict.confidence, 85);
        assert_eq!(verdict.matched_patterns.len(), 1);
    }

    #[test]
    fn test_found_patterns_scale_with_match_count() {
        let p = platform(&["followers", "joined", "posts"], &["does not exist"]);

        let one = classify_content("120 followers", &p, 200);
        assert!(one.found);
        assert_eq!(one.confidence, 82);

        let three = classify_content("followers - joined 2019 - 42 posts", &p, 200);
        assert!(three.found);
        assert_eq!(three.confidence, 86);
    }

    #[test]
    fn test_both_pattern_kinds_is_ambiguous() {
        let p = platform(&["followers"], &["does not exist"]);
        let verdict = classify_content("followers... this page does not exist", &p, 200);

        assert!(!verdict.found);
        assert_eq!(verdict.confidence, 60);
    }

    #[test]
    fn test_no_patterns_falls_back_to_status() {
        let p = platform(&["followers"], &["does not exist"]);

        let ok = classify_content("an unrelated page", &p, 200);
        assert!(ok.found);
        assert_eq!(ok.confidence, 40);

        let gone = classify_content("an unrelated page", &p, 410);
        assert!(!gone.found);
        assert_eq!(gone.confidence, 40);
    }

    #[test]
    fn test_generic_fallback_vocabulary() {
        let p = platform(&[], &[]);
        let verdict = classify_content("sorry, page not found", &p, 200);
        assert!(!verdict.found);
        assert_eq!(verdict.confidence, 85);
    }
}
