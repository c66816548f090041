//! handlescan Core - domain model and scoring logic for username probing
//!
//! This crate provides the foundational primitives:
//! - Platform catalog descriptors with templated profile URLs
//! - Username variation generation
//! - Probe and scored result types
//! - TTL'd result cache
//! - Risk scoring and false-positive filtering

pub mod cache;
pub mod clock;
pub mod filter;
pub mod platform;
pub mod result;
pub mod risk;
pub mod variations;

pub use cache::*;
pub use clock::*;
pub use filter::*;
pub use platform::*;
pub use result::*;
pub use risk::*;
pub use variations::*;

/// Cache TTL for positive (found) probe results, in seconds (24 hours)
pub const FOUND_TTL_SECS: i64 = 24 * 60 * 60;

/// Cache TTL for negative probe results, in seconds (7 days).
/// "Not found" is more stable than "found" - accounts appear far more
/// often than they disappear.
pub const NOT_FOUND_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Default confidence threshold below which a result is a false positive
pub const DEFAULT_FP_THRESHOLD: u8 = 40;

/// Minimum confidence / risk score
pub const MIN_SCORE: u8 = 0;

/// Maximum confidence / risk score
pub const MAX_SCORE: u8 = 100;
