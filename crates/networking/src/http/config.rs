//! Client configuration

use std::time::Duration;

/// Environment variable overriding the default backend URL
pub const API_URL_ENV: &str = "HABITLEAGUE_API_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`super::HabitLeagueClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, without a trailing slash (e.g. `http://10.0.0.5:8080`)
    pub base_url: String,
    /// Per-request timeout applied by the transport
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Resolve the base URL from the environment, falling back to localhost
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
