//! Search session state
//!
//! One session covers one end-to-end search for a single username. Status
//! only ever moves forward: pending -> running -> one terminal state.
//! Snapshots are the only view handed out to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::options::SearchOptions;
use handlescan_core::{ProbeFailure, RiskTier, ScoredResult};

/// Lifecycle state of a search session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Running,
    Completed,
    Cancelled,
    Error,
}

impl SessionStatus {
    /// Terminal states are absorbing
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Cancelled | SessionStatus::Error
        )
    }
}

/// Result counts bucketed by risk tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskTierCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub minimal: usize,
}

impl RiskTierCounts {
    fn tally(results: &[ScoredResult]) -> Self {
        let mut counts = Self::default();
        for result in results {
            match result.risk_tier {
                RiskTier::Critical => counts.critical += 1,
                RiskTier::High => counts.high += 1,
                RiskTier::Medium => counts.medium += 1,
                RiskTier::Low => counts.low += 1,
                RiskTier::Minimal => counts.minimal += 1,
            }
        }
        counts
    }
}

/// Immutable view of a session for callers
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub status: SessionStatus,
    /// Fraction of platforms settled (0.0 - 1.0)
    pub progress: f64,
    pub platforms_checked: usize,
    pub platforms_total: usize,
    pub results_count: usize,
    pub errors_count: usize,
    pub risk_tier_counts: RiskTierCounts,
}

/// One in-flight or finished search
#[derive(Debug)]
pub struct SearchSession {
    pub id: Uuid,
    pub username: String,
    pub options: SearchOptions,
    pub status: SessionStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub platforms_checked: usize,
    pub platforms_total: usize,
    pub results: Vec<ScoredResult>,
    pub errors: Vec<ProbeFailure>,
}

impl SearchSession {
    pub fn new(username: &str, options: SearchOptions, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            options,
            status: SessionStatus::Pending,
            start_time: now,
            end_time: None,
            platforms_checked: 0,
            platforms_total: 0,
            results: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Move to a terminal state, stamping the end time. A session already
    /// terminal stays where it is.
    pub fn finish(&mut self, status: SessionStatus, now: DateTime<Utc>) {
        debug_assert!(status.is_terminal());
        if self.status.is_terminal() {
            return;
        }
        self.status = status;
        self.end_time = Some(now);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let progress = if self.platforms_total == 0 {
            0.0
        } else {
            self.platforms_checked as f64 / self.platforms_total as f64
        };

        SessionSnapshot {
            id: self.id,
            status: self.status,
            progress,
            platforms_checked: self.platforms_checked,
            platforms_total: self.platforms_total,
            results_count: self.results.len(),
            errors_count: self.errors.len(),
            risk_tier_counts: RiskTierCounts::tally(&self.results),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SearchSession {
        SearchSession::new("alice", SearchOptions::default(), Utc::now())
    }

    #[test]
    fn test_new_session_is_pending() {
        let session = session();
        assert_eq!(session.status, SessionStatus::Pending);
        assert!(session.end_time.is_none());
        assert_eq!(session.snapshot().progress, 0.0);
    }

    #[test]
    fn test_terminal_states_absorb() {
        let mut session = session();
        session.status = SessionStatus::Running;

        let now = Utc::now();
        session.finish(SessionStatus::Cancelled, now);
        assert_eq!(session.status, SessionStatus::Cancelled);

        // A later completion attempt must not overwrite the terminal state
        session.finish(SessionStatus::Completed, Utc::now());
        assert_eq!(session.status, SessionStatus::Cancelled);
        assert_eq!(session.end_time, Some(now));
    }

    #[test]
    fn test_snapshot_progress() {
        let mut session = session();
        session.platforms_total = 4;
        session.platforms_checked = 1;
        assert_eq!(session.snapshot().progress, 0.25);
        assert!(session.platforms_checked <= session.platforms_total);
    }
}
