//! Probe coordinator
//!
//! Wraps the check strategies with cache lookup, confidence
//! post-adjustment, and cache persistence. Strategy-level errors never
//! propagate past this boundary - they become error probe results.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use handlescan_core::{cache_key, ttl_for, Platform, ProbeResult, ResultCache, MAX_SCORE};

use crate::strategy::{ProbeContext, StrategyRegistry};

/// One cached, confidence-adjusted platform check. The engine depends on
/// this seam, not on the concrete coordinator, so sessions can be driven by
/// a stub in tests.
#[async_trait]
pub trait PlatformProber: Send + Sync {
    async fn check_platform(
        &self,
        platform: &Platform,
        variation: &str,
        original_username: &str,
    ) -> ProbeResult;
}

/// Strategy dispatch + cache + confidence adjustment
pub struct ProbeCoordinator {
    registry: StrategyRegistry,
    cache: Arc<ResultCache>,
    ctx: ProbeContext,
}

impl ProbeCoordinator {
    pub fn new(registry: StrategyRegistry, cache: Arc<ResultCache>, ctx: ProbeContext) -> Self {
        Self {
            registry,
            cache,
            ctx,
        }
    }

    /// Post-probe confidence adjustment:
    /// +10 when the exact original username matched, +5 for found results
    /// on high-risk platforms, +2 per matched pattern capped at +10, -20
    /// when the probe carried an error.
    fn adjust_confidence(platform: &Platform, result: &mut ProbeResult) {
        let mut confidence = i32::from(result.confidence);

        if result.variation == result.original_username {
            confidence += 10;
        }
        if result.found && platform.high_risk() {
            confidence += 5;
        }
        confidence += (result.matched_patterns.len() as i32 * 2).min(10);
        if result.error.is_some() {
            confidence -= 20;
        }

        result.confidence = confidence.clamp(0, i32::from(MAX_SCORE)) as u8;
    }
}

#[async_trait]
impl PlatformProber for ProbeCoordinator {
    async fn check_platform(
        &self,
        platform: &Platform,
        variation: &str,
        original_username: &str,
    ) -> ProbeResult {
        let key = cache_key(&platform.name, variation);

        if let Some(mut cached) = self.cache.get(&key) {
            debug!("Cache hit for {} / {}", platform.name, variation);
            cached.from_cache = true;
            return cached;
        }

        let strategy = self.registry.select(platform.check_type);
        let mut result = match strategy
            .check(platform, variation, original_username, &self.ctx)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    "Strategy {} failed for {} / {}: {}",
                    strategy.name(),
                    platform.name,
                    variation,
                    e
                );
                ProbeResult::error(platform, variation, original_username, e.to_string(), self.ctx.now())
            }
        };

        Self::adjust_confidence(platform, &mut result);

        // Persist the platform-reference-free result wholesale
        self.cache.set(&key, result.clone(), ttl_for(&result));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ProbeError;
    use crate::strategy::CheckStrategy;
    use chrono::Utc;
    use handlescan_core::{Category, CheckType, FixedClock, Priority};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn platform(priority: Priority, check_type: CheckType) -> Platform {
        Platform {
            name: "Example".to_string(),
            url_template: "https://example.com/{username}".to_string(),
            category: Category::Social,
            priority,
            check_type,
            adult: false,
            urgent: false,
            requires_tor: false,
            slow: false,
            found_patterns: vec![],
            not_found_patterns: vec![],
        }
    }

    /// Scripted strategy: always found at a fixed confidence, counting calls
    struct ScriptedStrategy {
        confidence: u8,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CheckStrategy for ScriptedStrategy {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn check(
            &self,
            platform: &Platform,
            variation: &str,
            original_username: &str,
            ctx: &ProbeContext,
        ) -> Result<ProbeResult, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ProbeResult {
                platform_name: platform.name.clone(),
                url: platform.profile_url(variation),
                variation: variation.to_string(),
                original_username: original_username.to_string(),
                found: true,
                confidence: self.confidence,
                matched_patterns: vec![],
                http_status: Some(200),
                error: None,
                from_cache: false,
                timestamp: ctx.now(),
                body_snippet: None,
            })
        }
    }

    /// Strategy that always fails internally
    struct FailingStrategy;

    #[async_trait]
    impl CheckStrategy for FailingStrategy {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn check(
            &self,
            platform: &Platform,
            _variation: &str,
            _original_username: &str,
            _ctx: &ProbeContext,
        ) -> Result<ProbeResult, ProbeError> {
            Err(ProbeError::InvalidTemplate(platform.name.clone()))
        }
    }

    fn coordinator(strategy: Box<dyn CheckStrategy>) -> (ProbeCoordinator, Arc<ResultCache>) {
        let clock = Arc::new(FixedClock(Utc::now()));
        let cache = Arc::new(ResultCache::new(clock.clone()));
        let registry = StrategyRegistry::with_strategies(
            strategy,
            Box::new(FailingStrategy),
            Box::new(FailingStrategy),
        );
        let ctx = ProbeContext {
            clock,
            ..ProbeContext::default()
        };
        (ProbeCoordinator::new(registry, cache.clone(), ctx), cache)
    }

    #[tokio::test]
    async fn test_second_identical_probe_hits_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (coordinator, _cache) = coordinator(Box::new(ScriptedStrategy {
            confidence: 60,
            calls: calls.clone(),
        }));

        let p = platform(Priority::Medium, CheckType::Http);
        let first = coordinator.check_platform(&p, "alice99", "alice").await;
        let second = coordinator.check_platform(&p, "alice99", "alice").await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(second.found, first.found);
        assert_eq!(second.confidence, first.confidence);
    }

    #[tokio::test]
    async fn test_exact_variation_and_high_risk_bonuses() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (coordinator, _cache) = coordinator(Box::new(ScriptedStrategy {
            confidence: 60,
            calls,
        }));

        let p = platform(Priority::High, CheckType::Http);
        // Exact original on a high-risk platform: 60 + 10 + 5
        let result = coordinator.check_platform(&p, "alice", "alice").await;
        assert_eq!(result.confidence, 75);
    }

    #[tokio::test]
    async fn test_strategy_error_becomes_error_result() {
        let (coordinator, _cache) = coordinator(Box::new(FailingStrategy));

        let p = platform(Priority::Medium, CheckType::Http);
        let result = coordinator.check_platform(&p, "alice", "alice").await;

        assert!(!result.found);
        assert!(result.error.is_some());
        // 0 base + 10 exact - 20 error, clamped
        assert_eq!(result.confidence, 0);
    }

    #[tokio::test]
    async fn test_distinct_variations_do_not_share_cache_entries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (coordinator, cache) = coordinator(Box::new(ScriptedStrategy {
            confidence: 60,
            calls: calls.clone(),
        }));

        let p = platform(Priority::Medium, CheckType::Http);
        coordinator.check_platform(&p, "alice", "alice").await;
        coordinator.check_platform(&p, "Alice", "alice").await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }
}
