//! Status probe
//!
//! Cheapest check: an HTTP HEAD, falling back to GET when the HEAD fails or
//! returns a status that doesn't settle the question. Classification is by
//! status code alone.

use async_trait::async_trait;
use tracing::debug;

use handlescan_core::{Platform, ProbeResult};

use crate::client::{create_client, ProbeError};
use crate::strategy::{CheckStrategy, ProbeContext};

/// Status-code verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StatusVerdict {
    pub found: bool,
    pub confidence: u8,
    /// Whether the status settles the question without a GET
    pub decisive: bool,
}

/// Classify an HTTP status code.
/// 2xx: profile page served. 404: definitive absence. 403: the resource
/// exists but is access-restricted, a weak presence signal.
pub(crate) fn classify_status(status: u16) -> StatusVerdict {
    match status {
        200..=299 => StatusVerdict {
            found: true,
            confidence: 80,
            decisive: true,
        },
        404 => StatusVerdict {
            found: false,
            confidence: 90,
            decisive: true,
        },
        403 => StatusVerdict {
            found: true,
            confidence: 50,
            decisive: true,
        },
        _ => StatusVerdict {
            found: false,
            confidence: 20,
            decisive: false,
        },
    }
}

/// Confidence bonus when a found verdict is confirmed by a full GET
const GET_CONFIRMATION_BONUS: u8 = 10;

/// HEAD-then-GET status-code probe
pub struct StatusProbe;

#[async_trait]
impl CheckStrategy for StatusProbe {
    fn name(&self) -> &'static str {
        "status"
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

        let head_status = match client.head(&url).send().await {
            Ok(response) => Some(response.status().as_u16()),
            Err(e) => {
                debug!("HEAD {} failed: {}", url, e);
                None
            }
        };

        if let Some(status) = head_status {
            let verdict = classify_status(status);
            if verdict.decisive {
                return Ok(build(platform, variation, original_username, status, verdict, false, ctx));
            }
        }

        // HEAD failed or was ambiguous - fall back to GET
        match client.get(&url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let verdict = classify_status(status);
                let body = response.text().await.unwrap_or_default();
                let result =
                    build(platform, variation, original_username, status, verdict, true, ctx)
                        .with_body_snippet(&body);
                Ok(result)
            }
            Err(e) => Ok(ProbeResult::error(
                platform,
                variation,
                original_username,
                e.to_string(),
                ctx.now(),
            )),
        }
    }
}

fn build(
    platform: &Platform,
    variation: &str,
    original_username: &str,
    status: u16,
    verdict: StatusVerdict,
    via_get: bool,
    ctx: &ProbeContext,
) -> ProbeResult {
    let confidence = if verdict.found && via_get {
        verdict.confidence.saturating_add(GET_CONFIRMATION_BONUS)
    } else {
        verdict.confidence
    };

    ProbeResult {
        platform_name: platform.name.clone(),
        url: platform.profile_url(variation),
        variation: variation.to_string(),
        original_username: original_username.to_string(),
        found: verdict.found,
        confidence,
        matched_patterns: Vec::new(),
        http_status: Some(status),
        error: None,
        from_cache: false,
        timestamp: ctx.now(),
        body_snippet: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success() {
        let verdict = classify_status(200);
        assert!(verdict.found);
        assert_eq!(verdict.confidence, 80);
        assert!(verdict.decisive);
    }

    #[test]
    fn test_classify_not_found() {
        let verdict = classify_status(404);
        assert!(!verdict.found);
        assert_eq!(verdict.confidence, 90);
    }

    #[test]
    fn test_classify_forbidden_is_weak_presence() {
        let verdict = classify_status(403);
        assert!(verdict.found);
        assert_eq!(verdict.confidence, 50);
    }

    #[test]
    fn test_classify_other_codes_are_ambiguous() {
        for status in [301, 405, 429, 500, 503] {
            let verdict = classify_status(status);
            assert!(!verdict.found);
            assert_eq!(verdict.confidence, 20);
            assert!(!verdict.decisive);
        }
    }
}
