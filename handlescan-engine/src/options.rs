//! Search options
//!
//! Caller options merged with defaults at `start_search`. The spec's
//! tunables - false-positive threshold, risk weights, the heuristic
//! ambiguity bias, the worker limit - live here rather than as constants.

use handlescan_core::{Category, Priority, RiskWeights, DEFAULT_FP_THRESHOLD};

/// Per-search configuration
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Probe platforms hosting adult content
    pub include_adult: bool,
    /// Probe platforms only reachable through Tor
    pub include_tor: bool,
    /// Restrict to critical/high priority platforms
    pub priority_only: bool,
    /// Category allow-list; `None` admits every category
    pub categories: Option<Vec<Category>>,
    /// Cap on generated username variations
    pub max_variations: usize,
    /// Cap on probed platforms, filled critical-first
    pub max_platforms: usize,
    /// Whole-session timeout in seconds
    pub timeout_secs: u64,
    /// Bounded worker limit for concurrent platform probes
    pub max_concurrency: usize,
    /// Scan not-found pages for bare-username mentions
    pub keyword_pass: bool,
    /// Minimum mention count for the keyword pass to emit a signal
    pub keyword_threshold: usize,
    /// Confidence floor below which found results are suppressed
    pub fp_threshold: u8,
    /// Heuristic probes report found on total ambiguity
    pub assume_found_on_ambiguity: bool,
    /// Risk factor weights
    pub risk_weights: RiskWeights,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            include_adult: false,
            include_tor: false,
            priority_only: false,
            categories: None,
            max_variations: 30,
            max_platforms: 100,
            timeout_secs: 300,
            max_concurrency: 8,
            keyword_pass: false,
            keyword_threshold: 3,
            fp_threshold: DEFAULT_FP_THRESHOLD,
            assume_found_on_ambiguity: true,
            risk_weights: RiskWeights::default(),
        }
    }
}

impl SearchOptions {
    /// Variation attempts granted to one platform. Critical and high
    /// priority platforms get most of the list; low priority ones get the
    /// original plus a couple of folds.
    pub fn variation_budget(&self, priority: Priority, available: usize) -> usize {
        if available == 0 {
            return 0;
        }
        let budget = match priority {
            Priority::Critical => available,
            Priority::High => (available * 3).div_ceil(4),
            Priority::Medium => available.div_ceil(3),
            Priority::Low => 2,
        };
        budget.clamp(1, available)
    }
}
