//! Search engine
//!
//! Owns the session store and drives each search: variation generation,
//! platform selection, bounded-concurrency probe fan-out, aggregation,
//! filtering and scoring. Sessions are cancelled preemptively through a
//! per-session token that aborts in-flight probes.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use parking_lot::RwLock;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use handlescan_core::{
    FalsePositiveFilter, Platform, PlatformCatalog, Priority, ProbeFailure, ProbeResult,
    RiskScorer, ScoredResult, SharedClock, VariationGenerator,
};
use handlescan_probe::PlatformProber;

use crate::options::SearchOptions;
use crate::session::{SearchSession, SessionSnapshot, SessionStatus};

/// Confidence assigned to a bare-username mention found by the keyword pass
const KEYWORD_MENTION_CONFIDENCE: u8 = 45;

/// Errors surfaced synchronously from session setup
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Username is empty or invalid")]
    InvalidUsername,

    #[error("Platform catalog contains no platforms")]
    EmptyCatalog,
}

/// The work one platform task performs: its budgeted variation list
#[derive(Debug, Clone)]
struct PlatformPlan {
    platform: Platform,
    variations: Vec<String>,
}

/// Settled output of one platform task
struct PlatformOutcome {
    platform: Platform,
    probes: Vec<ProbeResult>,
    errors: Vec<ProbeFailure>,
}

/// Top-level search orchestrator and session store
pub struct SearchEngine {
    catalog: Arc<PlatformCatalog>,
    prober: Arc<dyn PlatformProber>,
    generator: VariationGenerator,
    clock: SharedClock,
    sessions: Arc<DashMap<Uuid, Arc<RwLock<SearchSession>>>>,
    tokens: Arc<DashMap<Uuid, CancellationToken>>,
}

impl SearchEngine {
    pub fn new(catalog: Arc<PlatformCatalog>, prober: Arc<dyn PlatformProber>, clock: SharedClock) -> Self {
        Self {
            catalog,
            prober,
            generator: VariationGenerator::new(clock.clone()),
            clock,
            sessions: Arc::new(DashMap::new()),
            tokens: Arc::new(DashMap::new()),
        }
    }

    /// Start a search. Validation failures surface here; everything after
    /// is absorbed into the session itself.
    pub fn start_search(&self, username: &str, options: SearchOptions) -> Result<Uuid, EngineError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(EngineError::InvalidUsername);
        }
        if self.catalog.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }

        let mut variations = self.generator.generate(username);
        variations.truncate(options.max_variations.max(1));

        let platforms = select_platforms(&self.catalog, &options);
        let plans: Vec<PlatformPlan> = platforms
            .into_iter()
            .map(|platform| {
                let budget = options.variation_budget(platform.priority, variations.len());
                PlatformPlan {
                    variations: variations[..budget].to_vec(),
                    platform,
                }
            })
            .collect();

        let mut session = SearchSession::new(username, options.clone(), self.clock.now());
        session.platforms_total = plans.len();
        // Running before the caller sees the id; pending never escapes
        session.status = SessionStatus::Running;
        let id = session.id;

        info!(
            "Session {} started: {} platforms x up to {} variations for {:?}",
            id,
            session.platforms_total,
            variations.len(),
            username
        );

        let session = Arc::new(RwLock::new(session));
        let token = CancellationToken::new();
        self.sessions.insert(id, session.clone());
        self.tokens.insert(id, token.clone());

        let runner = SessionRunner {
            prober: self.prober.clone(),
            clock: self.clock.clone(),
            tokens: self.tokens.clone(),
            session,
            token,
            options,
            plans,
            username: username.to_string(),
        };
        tokio::spawn(runner.run());

        Ok(id)
    }

    /// Immutable status snapshot of a session
    pub fn get_status(&self, id: Uuid) -> Option<SessionSnapshot> {
        self.sessions.get(&id).map(|entry| entry.read().snapshot())
    }

    /// Final (or partial, while running) results ordered by risk
    pub fn results(&self, id: Uuid) -> Option<Vec<ScoredResult>> {
        self.sessions.get(&id).map(|entry| entry.read().results.clone())
    }

    /// Probe failures recorded by a session
    pub fn errors(&self, id: Uuid) -> Option<Vec<ProbeFailure>> {
        self.sessions.get(&id).map(|entry| entry.read().errors.clone())
    }

    /// Cancel a running session. Only succeeds while the session is
    /// running; the token aborts in-flight probes and late results are
    /// discarded.
    pub fn cancel_search(&self, id: Uuid) -> bool {
        let Some(entry) = self.sessions.get(&id) else {
            return false;
        };

        {
            let mut session = entry.write();
            if session.status != SessionStatus::Running {
                return false;
            }
            session.finish(SessionStatus::Cancelled, self.clock.now());
            session.results.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
        }

        if let Some(token) = self.tokens.get(&id) {
            token.cancel();
        }
        info!("Session {} cancelled", id);
        true
    }

    /// Evict terminal sessions that ended more than `max_age` ago.
    /// Returns the number evicted.
    pub fn clear_old_searches(&self, max_age: chrono::Duration) -> usize {
        let now = self.clock.now();
        let before = self.sessions.len();

        self.sessions.retain(|_, entry| {
            let session = entry.read();
            match (session.status.is_terminal(), session.end_time) {
                (true, Some(end)) => now - end < max_age,
                _ => true,
            }
        });

        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            debug!("Evicted {} old sessions", removed);
        }
        removed
    }
}

/// Filter the catalog by the session options, order critical-first, and
/// cap to `max_platforms`.
fn select_platforms(catalog: &PlatformCatalog, options: &SearchOptions) -> Vec<Platform> {
    let mut selected: Vec<Platform> = catalog
        .iter()
        .filter(|p| {
            if p.adult && !options.include_adult {
                return false;
            }
            if p.requires_tor && !options.include_tor {
                return false;
            }
            if options.priority_only && !matches!(p.priority, Priority::Critical | Priority::High) {
                return false;
            }
            if let Some(categories) = &options.categories {
                if !categories.contains(&p.category) {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect();

    // Stable: catalog order preserved within a tier
    selected.sort_by_key(|p| p.priority);
    selected.truncate(options.max_platforms.max(1));
    selected
}

/// Owns one session run from fan-out to terminal state
struct SessionRunner {
    prober: Arc<dyn PlatformProber>,
    clock: SharedClock,
    tokens: Arc<DashMap<Uuid, CancellationToken>>,
    session: Arc<RwLock<SearchSession>>,
    token: CancellationToken,
    options: SearchOptions,
    plans: Vec<PlatformPlan>,
    username: String,
}

impl SessionRunner {
    async fn run(self) {
        let SessionRunner {
            prober,
            clock,
            tokens,
            session,
            token,
            options,
            plans,
            username,
        } = self;

        let id = session.read().id;
        let filter = FalsePositiveFilter::new(options.fp_threshold);
        let scorer = RiskScorer::new(options.risk_weights);

        let timeout = tokio::time::sleep(Duration::from_secs(options.timeout_secs));
        tokio::pin!(timeout);

        let mut outcomes = stream::iter(plans)
            .map(|plan| {
                let prober = prober.clone();
                let username = username.clone();
                let token = token.clone();
                async move { run_platform(plan, prober, username, token).await }
            })
            .buffer_unordered(options.max_concurrency.max(1));

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Session {} cancellation observed", id);
                    break;
                }
                _ = &mut timeout => {
                    warn!("Session {} hit its {}s timeout", id, options.timeout_secs);
                    token.cancel();
                    break;
                }
                outcome = outcomes.next() => match outcome {
                    Some(outcome) => absorb(&session, outcome, &filter, &scorer, &options),
                    None => break,
                },
            }
        }
        drop(outcomes);

        {
            let mut session = session.write();
            // No-op when cancellation already finished the session
            session.finish(SessionStatus::Completed, clock.now());
            session.results.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
            info!(
                "Session {} finished as {:?}: {}/{} platforms, {} results, {} errors",
                id,
                session.status,
                session.platforms_checked,
                session.platforms_total,
                session.results.len(),
                session.errors.len()
            );
        }
        tokens.remove(&id);
    }
}

/// Probe one platform's variation budget, honoring cancellation between
/// and during probes.
async fn run_platform(
    plan: PlatformPlan,
    prober: Arc<dyn PlatformProber>,
    original_username: String,
    token: CancellationToken,
) -> PlatformOutcome {
    let mut probes = Vec::with_capacity(plan.variations.len());
    let mut errors = Vec::new();

    for variation in &plan.variations {
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            result = prober.check_platform(&plan.platform, variation, &original_username) => result,
        };

        if let Some(error) = &result.error {
            errors.push(ProbeFailure {
                platform: plan.platform.name.clone(),
                variation: variation.clone(),
                error: error.clone(),
            });
        }
        probes.push(result);
    }

    PlatformOutcome {
        platform: plan.platform,
        probes,
        errors,
    }
}

/// Fold one settled platform into the session: progress, errors, filtered
/// and scored results, and the optional keyword pass. Late settlements
/// after a terminal transition are discarded.
fn absorb(
    session: &Arc<RwLock<SearchSession>>,
    outcome: PlatformOutcome,
    filter: &FalsePositiveFilter,
    scorer: &RiskScorer,
    options: &SearchOptions,
) {
    let mut session = session.write();
    if session.status != SessionStatus::Running {
        debug!("Discarding late results for {}", outcome.platform.name);
        return;
    }

    session.platforms_checked += 1;
    session.errors.extend(outcome.errors);

    let found: Vec<(&Platform, ProbeResult)> = outcome
        .probes
        .iter()
        .filter(|r| r.found)
        .map(|r| (&outcome.platform, r.clone()))
        .collect();

    for (platform, result) in filter.filter_results(found) {
        let risk = scorer.calculate_risk(&platform, &result);
        let message = describe(&result);
        session.results.push(ScoredResult::new(&platform, &result, risk, message));
    }

    if options.keyword_pass {
        let needle = session.username.to_lowercase();
        for probe in outcome.probes.iter().filter(|r| !r.found && r.error.is_none()) {
            let Some(snippet) = &probe.body_snippet else {
                continue;
            };
            let mentions = snippet.matches(&needle).count();
            if mentions < options.keyword_threshold {
                continue;
            }

            let mut mention = probe.clone();
            mention.found = true;
            mention.confidence = KEYWORD_MENTION_CONFIDENCE;

            let verdict = filter.analyze(&outcome.platform, &mention);
            if verdict.is_false_positive {
                continue;
            }
            mention.confidence = verdict.confidence;

            let risk = scorer.calculate_risk(&outcome.platform, &mention);
            session.results.push(ScoredResult::new(
                &outcome.platform,
                &mention,
                risk,
                format!("Username mentioned {mentions} times in page content"),
            ));
        }
    }
}

/// Human-readable note on how a hit was established
fn describe(result: &ProbeResult) -> String {
    if result.from_cache {
        return "Known profile (cached result)".to_string();
    }
    if !result.matched_patterns.is_empty() {
        return format!("Matched {} content pattern(s)", result.matched_patterns.len());
    }
    match result.http_status {
        Some(403) => "Profile exists but is access-restricted (HTTP 403)".to_string(),
        Some(status) => format!("Profile page responded with HTTP {status}"),
        None => "Profile detected heuristically".to_string(),
    }
}
