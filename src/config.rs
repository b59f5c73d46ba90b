//! Service configuration parsed from environment variables.
//!
//! Numeric tunables fall back to their defaults when absent or malformed.
//! Values that change where requests go (the API base URL) fail loudly.

use std::time::Duration;

use canvas::doc::Platform;

pub const DEFAULT_CONTENT_API_BASE_URL: &str = "http://127.0.0.1:3000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 120;
pub const DEFAULT_SLOW_MAX_ATTEMPTS: u32 = 300;
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 1000;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Polling policy for remote ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
    /// Budget for platforms whose scrapes routinely take minutes.
    pub slow_max_attempts: u32,
    /// Trigger analysis as soon as ingestion completes.
    pub auto_analyze: bool,
}

impl IngestConfig {
    #[must_use]
    pub fn max_attempts_for(&self, platform: Platform) -> u32 {
        match platform {
            Platform::Youtube => self.slow_max_attempts,
            Platform::Instagram | Platform::Tiktok | Platform::Unknown => self.max_attempts,
        }
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            slow_max_attempts: DEFAULT_SLOW_MAX_ATTEMPTS,
            auto_analyze: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub api_base_url: String,
    pub timeouts: ApiTimeouts,
    pub ingest: IngestConfig,
    pub flush_interval_ms: u64,
    pub project_id: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_CONTENT_API_BASE_URL.to_owned(),
            timeouts: ApiTimeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            ingest: IngestConfig::default(),
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            project_id: None,
        }
    }
}

impl ServiceConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `CONTENT_API_BASE_URL`: default `http://127.0.0.1:3000/api`
    /// - `CONTENT_API_REQUEST_TIMEOUT_SECS`: default 60
    /// - `CONTENT_API_CONNECT_TIMEOUT_SECS`: default 10
    /// - `INGEST_POLL_INTERVAL_MS`: default 1000
    /// - `INGEST_MAX_ATTEMPTS`: default 120
    /// - `INGEST_SLOW_MAX_ATTEMPTS`: default 300
    /// - `INGEST_AUTO_ANALYZE`: default true
    /// - `BOARD_FLUSH_INTERVAL_MS`: default 1000
    /// - `PROJECT_ID`: required only by commands that talk to the content API
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` when the base URL is not an absolute http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with a custom variable source.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("CONTENT_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_CONTENT_API_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        validate_base_url(&api_base_url)?;

        let timeouts = ApiTimeouts {
            request_secs: parse_or(&lookup, "CONTENT_API_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_or(&lookup, "CONTENT_API_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let ingest = IngestConfig {
            poll_interval_ms: parse_or(&lookup, "INGEST_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS),
            max_attempts: parse_or(&lookup, "INGEST_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS),
            slow_max_attempts: parse_or(&lookup, "INGEST_SLOW_MAX_ATTEMPTS", DEFAULT_SLOW_MAX_ATTEMPTS),
            auto_analyze: parse_or(&lookup, "INGEST_AUTO_ANALYZE", true),
        };
        let flush_interval_ms = parse_or(&lookup, "BOARD_FLUSH_INTERVAL_MS", DEFAULT_FLUSH_INTERVAL_MS);
        let project_id = lookup("PROJECT_ID").filter(|v| !v.trim().is_empty());

        Ok(Self { api_base_url, timeouts, ingest, flush_interval_ms, project_id })
    }

    /// The collaborator project id, for commands that cannot run without it.
    ///
    /// # Errors
    ///
    /// `ConfigError::Missing` when `PROJECT_ID` was not set.
    pub fn require_project_id(&self) -> Result<&str, ConfigError> {
        self.project_id.as_deref().ok_or(ConfigError::Missing("PROJECT_ID"))
    }

    #[must_use]
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "unparseable config value; using default");
            default
        }),
        None => default,
    }
}

fn validate_base_url(raw: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::Invalid { key: "CONTENT_API_BASE_URL", value: raw.to_owned() };
    let url = reqwest::Url::parse(raw).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
