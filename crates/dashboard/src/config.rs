//! Dashboard configuration.

use std::time::Duration;

use anyhow::Context;

pub const API_URL_ENV: &str = "SHELFWATCH_API_URL";
pub const TIMEOUT_ENV: &str = "SHELFWATCH_TIMEOUT_SECS";

/// Client configuration for talking to the backing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Base URL of the backing service (no trailing slash).
    pub api_url: String,
    /// Per-call timeout; a timed-out call counts as a transport failure.
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Capacity of the dashboard event channel (lossy for slow subscribers).
    pub event_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            request_timeout: Duration::from_secs(10),
            user_agent: format!("shelfwatch/{}", env!("CARGO_PKG_VERSION")),
            event_capacity: 64,
        }
    }
}

impl DashboardConfig {
    /// Build a configuration from `SHELFWATCH_API_URL` and `SHELFWATCH_TIMEOUT_SECS`,
    /// falling back to defaults for unset variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_ENV) {
            config = config.with_api_url(url);
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{TIMEOUT_ENV} must be a whole number of seconds, got {raw:?}"))?;
            anyhow::ensure!(secs > 0, "{TIMEOUT_ENV} must be greater than zero");
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Absolute URL for an endpoint path such as `/stock`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}
