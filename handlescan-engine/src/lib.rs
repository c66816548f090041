//! handlescan search engine
//!
//! The top-level orchestrator: session lifecycle, platform selection,
//! bounded-concurrency probe fan-out, aggregation and cancellation.

pub mod engine;
pub mod options;
pub mod session;

pub use engine::{EngineError, SearchEngine};
pub use options::SearchOptions;
pub use session::{RiskTierCounts, SearchSession, SessionSnapshot, SessionStatus};
