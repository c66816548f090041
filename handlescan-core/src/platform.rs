//! Platform catalog
//!
//! Immutable descriptors of external sites with templated profile URLs.
//! The catalog is loaded once at startup (typically from JSON) and only
//! ever read by the engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Priority tier of a platform within the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Normalized severity used as a risk factor (0.0 - 1.0)
    pub fn weight(&self) -> f64 {
        match self {
            Priority::Critical => 1.0,
            Priority::High => 0.75,
            Priority::Medium => 0.5,
            Priority::Low => 0.25,
        }
    }
}

/// How a platform's presence check is performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckType {
    /// HTTP status-code probe (HEAD, then GET)
    #[default]
    Http,
    /// Body-pattern classification probe
    Content,
    /// Heuristic probe with browser-realistic headers
    Manual,
    /// Unrecognized check type; dispatched as an Http status probe
    #[serde(other)]
    Unknown,
}

/// Content category of a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Adult,
    Cam,
    Escort,
    Darkweb,
    Dating,
    Social,
    Forum,
    Gaming,
    Crypto,
    Media,
    Professional,
    Portfolio,
    #[serde(other)]
    #[default]
    Other,
}

impl Category {
    /// Category exposure weight used as a risk factor (0.0 - 1.0)
    pub fn risk_weight(&self) -> f64 {
        match self {
            Category::Adult | Category::Cam | Category::Escort | Category::Darkweb => 1.0,
            Category::Dating => 0.8,
            Category::Social | Category::Forum => 0.6,
            Category::Gaming | Category::Media | Category::Crypto => 0.5,
            Category::Other => 0.4,
            Category::Professional | Category::Portfolio => 0.2,
        }
    }
}

/// One external platform to probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    /// Human-readable name, unique within a catalog
    pub name: String,
    /// Profile URL template with a {username} placeholder
    pub url_template: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub check_type: CheckType,
    /// Hosts adult content
    #[serde(default)]
    pub adult: bool,
    /// Flagged for immediate attention regardless of other factors
    #[serde(default)]
    pub urgent: bool,
    /// Only reachable through Tor (SOCKS5h proxy)
    #[serde(default)]
    pub requires_tor: bool,
    /// Known-slow host; status probes get an extended timeout
    #[serde(default)]
    pub slow: bool,
    /// Body substrings indicating the profile exists
    #[serde(default)]
    pub found_patterns: Vec<String>,
    /// Body substrings indicating the profile does not exist
    #[serde(default)]
    pub not_found_patterns: Vec<String>,
}

fn default_priority() -> Priority {
    Priority::Medium
}

impl Platform {
    /// Build the profile URL for a username variation.
    /// The variation is percent-encoded before substitution.
    pub fn profile_url(&self, variation: &str) -> String {
        self.url_template
            .replace("{username}", &urlencoding::encode(variation))
    }

    /// Whether a positive hit on this platform is high-risk
    pub fn high_risk(&self) -> bool {
        self.urgent || matches!(self.priority, Priority::Critical | Priority::High)
    }
}

/// Errors loading a platform catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog contains no platforms")]
    Empty,

    #[error("Platform {0:?} has no {{username}} placeholder in its URL template")]
    BadTemplate(String),
}

/// Ordered, read-only list of platforms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformCatalog {
    platforms: Vec<Platform>,
}

impl PlatformCatalog {
    /// Wrap an already-validated platform list
    pub fn new(platforms: Vec<Platform>) -> Self {
        Self { platforms }
    }

    /// Parse a catalog from its JSON representation (an array of platforms)
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let platforms: Vec<Platform> = serde_json::from_str(json)?;
        if platforms.is_empty() {
            return Err(CatalogError::Empty);
        }
        for p in &platforms {
            if !p.url_template.contains("{username}") {
                return Err(CatalogError::BadTemplate(p.name.clone()));
            }
        }
        Ok(Self { platforms })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}
