//! handlescan network probing layer
//!
//! HTTP client construction (clearnet and Tor), the presence-check
//! strategies, and the probe coordinator that wraps them with caching and
//! confidence adjustment.

pub mod client;
pub mod content;
pub mod coordinator;
pub mod heuristic;
pub mod status;
pub mod strategy;

pub use client::{HttpConfig, ProbeError};
pub use content::ContentProbe;
pub use coordinator::{PlatformProber, ProbeCoordinator};
pub use heuristic::HeuristicProbe;
pub use status::StatusProbe;
pub use strategy::{CheckStrategy, ProbeContext, StrategyRegistry};
