//! Result cache
//!
//! TTL-keyed store of prior probe outcomes, shared across sessions.
//! Entries are written wholesale and never partially mutated, so concurrent
//! access needs no coordination beyond the map itself. Expired entries are
//! evicted lazily on read, or in bulk via [`ResultCache::sweep`].

use chrono::Duration;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::debug;

use crate::clock::{SharedClock, SystemClock};
use crate::result::ProbeResult;
use crate::{FOUND_TTL_SECS, NOT_FOUND_TTL_SECS};

/// Cache key for a (platform, variation) pair. Case-sensitive in the
/// variation: "Alice" and "alice" are distinct probes.
pub fn cache_key(platform_name: &str, variation: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(platform_name.as_bytes());
    hasher.update([0u8]);
    hasher.update(variation.as_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}

/// TTL for a probe result. Negative results are far more stable than
/// positive ones, so they live longer.
pub fn ttl_for(result: &ProbeResult) -> Duration {
    if result.found {
        Duration::seconds(FOUND_TTL_SECS)
    } else {
        Duration::seconds(NOT_FOUND_TTL_SECS)
    }
}

struct CacheEntry {
    result: ProbeResult,
    ttl: Duration,
}

/// TTL-keyed store of probe outcomes
pub struct ResultCache {
    entries: DashMap<String, CacheEntry>,
    clock: SharedClock,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl ResultCache {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Look up a cached result. Expired entries count as a miss and are
    /// evicted on the spot.
    pub fn get(&self, key: &str) -> Option<ProbeResult> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                let age = self.clock.now() - entry.result.timestamp;
                if age < entry.ttl {
                    return Some(entry.result.clone());
                }
                true
            }
            None => false,
        };

        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// Store a result under a TTL, replacing any previous entry wholesale
    pub fn set(&self, key: &str, result: ProbeResult, ttl: Duration) {
        self.entries.insert(key.to_string(), CacheEntry { result, ttl });
    }

    /// Remove every expired entry. Returns the number removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now - entry.result.timestamp < entry.ttl);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!("Cache sweep removed {} expired entries", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
