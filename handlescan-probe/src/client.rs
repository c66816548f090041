//! HTTP client construction
//!
//! Builds reqwest clients for probing: clearnet by default, SOCKS5h through
//! a local Tor proxy for platforms flagged `requires_tor`. User agents are
//! rotated per client.

use reqwest::{Client, Proxy};
use std::time::Duration;
use thiserror::Error;

/// Default per-probe timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Extended timeout for platforms flagged slow, and for heuristic probes
pub const SLOW_TIMEOUT_SECS: u64 = 30;

/// HTTP probing configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// SOCKS5h proxy for Tor-only platforms (default: 127.0.0.1:9050)
    pub socks_addr: String,
    /// Per-probe timeout in seconds
    pub timeout_secs: u64,
    /// Timeout for slow platforms and heuristic probes
    pub slow_timeout_secs: u64,
    /// Maximum redirects to follow
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            socks_addr: "socks5h://127.0.0.1:9050".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            slow_timeout_secs: SLOW_TIMEOUT_SECS,
            max_redirects: 10,
        }
    }
}

impl HttpConfig {
    /// Probe timeout for a platform, honoring its slow flag
    pub fn timeout_for(&self, slow: bool) -> Duration {
        if slow {
            Duration::from_secs(self.slow_timeout_secs)
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }
}

/// Errors from the probing layer
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid URL template for platform {0}")]
    InvalidTemplate(String),
}

/// User agents for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:137.0) Gecko/20100101 Firefox/137.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.7; rv:137.0) Gecko/20100101 Firefox/137.0",
];

/// Get a random user agent
pub fn random_user_agent() -> &'static str {
    use rand::Rng;
    let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
    USER_AGENTS[idx]
}

/// Create an HTTP client for probing. `tor` routes the client through the
/// configured SOCKS5h proxy.
pub fn create_client(config: &HttpConfig, tor: bool, timeout: Duration) -> Result<Client, ProbeError> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .user_agent(random_user_agent())
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects));

    if tor {
        let proxy = Proxy::all(&config.socks_addr)
            .map_err(|e| ProbeError::ClientBuild(e.to_string()))?;
        // Many .onion sites have self-signed certs
        builder = builder.proxy(proxy).danger_accept_invalid_certs(true);
    }

    builder
        .build()
        .map_err(|e| ProbeError::ClientBuild(e.to_string()))
}
