//! Client configuration loaded via OrthoConfig.
//!
//! Values come from `LUNCH_*` environment variables and the optional config
//! file; command-line flags on the `lunch` binary override a subset.

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{ClientError, MIN_POLL_INTERVAL};
use crate::outbound::http::{EndpointPaths, HttpBackendConfig};

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_STATE_DIR: &str = ".lunch-vote";
const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Settings for the backend connection, local state, and logging.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LUNCH")]
pub struct ClientSettings {
    /// Backend root URL.
    pub base_url: Option<String>,
    /// Shared key sent as `X-API-KEY`.
    pub api_key: Option<String>,
    /// Directory holding `client-state.json`.
    pub state_dir: Option<String>,
    /// Delay between candidate list refreshes.
    pub poll_interval_ms: Option<u64>,
    /// Per-request timeout; unset waits indefinitely.
    pub request_timeout_secs: Option<u64>,
    /// User lookup template; without `{name}` the query form is used.
    pub user_lookup_path: Option<String>,
    /// Emit logs as JSON lines.
    #[ortho_config(default = false)]
    pub json_logs: bool,
}

impl ClientSettings {
    /// Parsed backend URL, falling back to the local default.
    ///
    /// # Errors
    ///
    /// Returns invalid request when the configured URL does not parse.
    pub fn base_url(&self) -> Result<Url, ClientError> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Url::parse(raw).map_err(|err| ClientError::invalid_request(format!("base url {raw:?}: {err}")))
    }

    /// State directory, falling back to `.lunch-vote`.
    #[must_use]
    pub fn state_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(self.state_dir.as_deref().unwrap_or(DEFAULT_STATE_DIR))
    }

    /// Poll interval, clamped to at least [`MIN_POLL_INTERVAL`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        let millis = self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        Duration::from_millis(millis).max(MIN_POLL_INTERVAL)
    }

    /// Request timeout, if one is configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Endpoint templates with the configured lookup path applied.
    #[must_use]
    pub fn endpoint_paths(&self) -> EndpointPaths {
        let mut paths = EndpointPaths::default();
        if let Some(lookup) = self
            .user_lookup_path
            .as_deref()
            .map(str::trim)
            .filter(|lookup| !lookup.is_empty())
        {
            lookup.clone_into(&mut paths.user_lookup);
        }
        paths
    }

    /// Full HTTP adapter configuration.
    ///
    /// # Errors
    ///
    /// Returns invalid request when the base URL does not parse.
    pub fn http_config(&self) -> Result<HttpBackendConfig, ClientError> {
        Ok(HttpBackendConfig {
            base_url: self.base_url()?,
            api_key: self.api_key.clone().filter(|key| !key.trim().is_empty()),
            timeout: self.request_timeout(),
            paths: self.endpoint_paths(),
        })
    }
}
