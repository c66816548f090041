//! Check strategies
//!
//! A strategy performs one (platform, variation) presence check. Expected
//! failures - transport errors, timeouts, unparseable bodies - are absorbed
//! into a not-found, zero-confidence [`ProbeResult`]; only unexpected
//! internal failures surface as `Err` and are converted at the coordinator
//! boundary. Dispatch is a pure `check_type -> strategy` mapping with the
//! status probe as the documented fallback for unknown types.

use async_trait::async_trait;
use std::sync::Arc;

use handlescan_core::{CheckType, Platform, ProbeResult, SharedClock, SystemClock};

use crate::client::{HttpConfig, ProbeError};
use crate::content::ContentProbe;
use crate::heuristic::HeuristicProbe;
use crate::status::StatusProbe;

/// Shared state handed to every strategy invocation
#[derive(Clone)]
pub struct ProbeContext {
    pub http: HttpConfig,
    pub clock: SharedClock,
    /// Heuristic probes default to found on total ambiguity - an explicit
    /// recall-over-precision bias, tunable per search.
    pub assume_found_on_ambiguity: bool,
}

impl Default for ProbeContext {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            clock: Arc::new(SystemClock),
            assume_found_on_ambiguity: true,
        }
    }
}

impl ProbeContext {
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }
}

/// One (platform, variation) presence check
#[async_trait]
pub trait CheckStrategy: Send + Sync {
    /// Strategy name for logging
    fn name(&self) -> &'static str;

    async fn check(
        &self,
        platform: &Platform,
        variation: &str,
        original_username: &str,
        ctx: &ProbeContext,
    ) -> Result<ProbeResult, ProbeError>;
}

/// Maps a platform's check type to its strategy
pub struct StrategyRegistry {
    status: Box<dyn CheckStrategy>,
    content: Box<dyn CheckStrategy>,
    heuristic: Box<dyn CheckStrategy>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self {
            status: Box::new(StatusProbe),
            content: Box::new(ContentProbe),
            heuristic: Box::new(HeuristicProbe),
        }
    }
}

impl StrategyRegistry {
    /// Registry with custom strategies (scripted strategies in tests)
    pub fn with_strategies(
        status: Box<dyn CheckStrategy>,
        content: Box<dyn CheckStrategy>,
        heuristic: Box<dyn CheckStrategy>,
    ) -> Self {
        Self {
            status,
            content,
            heuristic,
        }
    }

    /// Select the strategy for a check type. Unknown types dispatch to the
    /// status probe.
    pub fn select(&self, check_type: CheckType) -> &dyn CheckStrategy {
        match check_type {
            CheckType::Http | CheckType::Unknown => self.status.as_ref(),
            CheckType::Content => self.content.as_ref(),
            CheckType::Manual => self.heuristic.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_dispatch() {
        let registry = StrategyRegistry::default();
        assert_eq!(registry.select(CheckType::Http).name(), "status");
        assert_eq!(registry.select(CheckType::Content).name(), "content");
        assert_eq!(registry.select(CheckType::Manual).name(), "heuristic");
        // Unknown check types fall back to the status probe
        assert_eq!(registry.select(CheckType::Unknown).name(), "status");
    }
}
