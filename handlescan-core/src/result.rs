//! Probe and scored result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::{Category, Platform};

/// Longest body excerpt retained on a probe result. Enough for the
/// false-positive filter and keyword pass to re-score cached results.
pub const BODY_SNIPPET_CAP: usize = 2048;

/// Outcome of one presence probe for a (platform, variation) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Name of the probed platform (the full descriptor is never cached)
    pub platform_name: String,
    /// Profile URL the probe fetched
    pub url: String,
    /// Username variation that was checked
    pub variation: String,
    /// The username the search was started with
    pub original_username: String,
    /// Whether the handle appears to exist on the platform
    pub found: bool,
    /// Estimated correctness of the verdict (0-100)
    pub confidence: u8,
    /// Platform patterns that matched the fetched body
    pub matched_patterns: Vec<String>,
    /// HTTP status of the decisive response, when one was received
    pub http_status: Option<u16>,
    /// Failure reason, when the probe could not complete
    pub error: Option<String>,
    /// Whether this result was served from the cache
    pub from_cache: bool,
    /// When the probe (not the cache read) happened
    pub timestamp: DateTime<Utc>,
    /// Truncated, lowercased excerpt of the fetched body
    pub body_snippet: Option<String>,
}

impl ProbeResult {
    /// A not-found result carrying a failure reason
    pub fn error(
        platform: &Platform,
        variation: &str,
        original_username: &str,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            platform_name: platform.name.clone(),
            url: platform.profile_url(variation),
            variation: variation.to_string(),
            original_username: original_username.to_string(),
            found: false,
            confidence: 0,
            matched_patterns: Vec::new(),
            http_status: None,
            error: Some(reason.into()),
            from_cache: false,
            timestamp: now,
            body_snippet: None,
        }
    }

    /// Store a truncated, lowercased body excerpt
    pub fn with_body_snippet(mut self, body: &str) -> Self {
        let lowered = body.to_lowercase();
        let mut end = lowered.len().min(BODY_SNIPPET_CAP);
        while !lowered.is_char_boundary(end) {
            end -= 1;
        }
        self.body_snippet = Some(lowered[..end].to_string());
        self
    }
}

/// Severity tier derived from a risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Critical,
    High,
    Medium,
    Low,
    Minimal,
}

impl RiskTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => RiskTier::Critical,
            60..=79 => RiskTier::High,
            40..=59 => RiskTier::Medium,
            20..=39 => RiskTier::Low,
            _ => RiskTier::Minimal,
        }
    }
}

/// A found, filtered, risk-scored probe result - one output row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredResult {
    pub platform_name: String,
    pub url: String,
    pub variation_used: String,
    pub original_username: String,
    pub risk_score: u8,
    pub risk_tier: RiskTier,
    pub confidence: u8,
    pub category: Category,
    pub adult: bool,
    /// Human-readable note on how the hit was established
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ScoredResult {
    /// Assemble an output row from a positive probe
    pub fn new(platform: &Platform, result: &ProbeResult, risk_score: u8, message: String) -> Self {
        Self {
            platform_name: platform.name.clone(),
            url: result.url.clone(),
            variation_used: result.variation.clone(),
            original_username: result.original_username.clone(),
            risk_score,
            risk_tier: RiskTier::from_score(risk_score),
            confidence: result.confidence,
            category: platform.category,
            adult: platform.adult,
            message,
            timestamp: result.timestamp,
        }
    }
}

/// A probe that failed, as recorded on the session's error list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeFailure {
    pub platform: String,
    pub variation: String,
    pub error: String,
}
