//! Heuristic probe
//!
//! Last-resort check for platforms marked "manual": a GET with
//! browser-realistic headers and a generous timeout, classified against
//! generic error/success vocabularies. On total ambiguity it defaults to
//! found at confidence 50 - a deliberate recall-over-precision bias, kept
//! as an explicit option rather than resolved away.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use handlescan_core::{Platform, ProbeResult};

use crate::client::{create_client, ProbeError};
use crate::strategy::{CheckStrategy, ProbeContext};

/// Generic markers that the page is an error or removal notice
const ERROR_KEYWORDS: &[&str] = &[
    "not found",
    "doesn't exist",
    "does not exist",
    "unavailable",
    "suspended",
    "removed",
    "something went wrong",
];

/// Generic markers that the page is a live profile
const SUCCESS_KEYWORDS: &[&str] = &[
    "profile",
    "followers",
    "posts",
    "joined",
    "member",
    "about",
];

/// Confidence assigned to an ambiguous heuristic verdict
const AMBIGUOUS_CONFIDENCE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeuristicVerdict {
    Found(u8),
    NotFound(u8),
    Ambiguous,
}

/// Keyword classification of a fetched body. Non-2xx/403 statuses and
/// error-keyword hits read as absence; success keywords without error
/// keywords read as presence; everything else is ambiguous.
pub(crate) fn classify_heuristic(body_lower: &str, http_status: u16) -> HeuristicVerdict {
    if !matches!(http_status, 200..=299 | 403) {
        return HeuristicVerdict::NotFound(70);
    }

    let errors = ERROR_KEYWORDS.iter().filter(|k| body_lower.contains(*k)).count();
    let successes = SUCCESS_KEYWORDS.iter().filter(|k| body_lower.contains(*k)).count();

    match (errors, successes) {
        (e, 0) if e > 0 => HeuristicVerdict::NotFound(75),
        (0, s) if s > 0 => HeuristicVerdict::Found(70),
        _ => HeuristicVerdict::Ambiguous,
    }
}

/// Browser-header GET probe for platforms without a reliable signal
pub struct HeuristicProbe;

#[async_trait]
impl CheckStrategy for HeuristicProbe {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn check(
        &self,
        platform: &Platform,
        variation: &str,
        original_username: &str,
        ctx: &ProbeContext,
    ) -> Result<ProbeResult, ProbeError> {
        let url = platform.profile_url(variation);
        let timeout = Duration::from_secs(ctx.http.slow_timeout_secs);
        let client = create_client(&ctx.http, platform.requires_tor, timeout)?;

        let response = match client
            .get(&url)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!("Heuristic GET {} failed: {}", url, e);
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

        let (found, confidence) = match classify_heuristic(&body_lower, status) {
            HeuristicVerdict::Found(confidence) => (true, confidence),
            HeuristicVerdict::NotFound(confidence) => (false, confidence),
            HeuristicVerdict::Ambiguous => (ctx.assume_found_on_ambiguity, AMBIGUOUS_CONFIDENCE),
        };

        Ok(ProbeResult {
            platform_name: platform.name.clone(),
            url,
            variation: variation.to_string(),
            original_username: original_username.to_string(),
            found,
            confidence,
            matched_patterns: Vec::new(),
            http_status: Some(status),
            error: None,
            from_cache: false,
            timestamp: ctx.now(),
            body_snippet: None,
        }
        .with_body_snippet(&body))
    }
}
