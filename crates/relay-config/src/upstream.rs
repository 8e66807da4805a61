use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Upstream completion API configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// API key for authentication
    ///
    /// Falls back to the `GROQ_API_KEY` environment variable when unset.
    /// Absence is not a load error: every relayed request fails with a
    /// misconfiguration response until a key is available.
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Model requested for every relayed completion
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum silence between upstream stream chunks before the invocation
    /// is terminated (e.g. "30s", "5m"); unset disables the bound
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: Option<String>,
}

impl UpstreamConfig {
    /// Parse the configured idle timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid duration string
    pub fn idle_timeout_duration(&self) -> anyhow::Result<Option<Duration>> {
        self.idle_timeout
            .as_deref()
            .map(|s| duration_str::parse(s).map_err(|e| anyhow::anyhow!("invalid upstream.idle_timeout '{s}': {e}")))
            .transpose()
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_model(),
            idle_timeout: default_idle_timeout(),
        }
    }
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_idle_timeout() -> Option<String> {
    Some("5m".to_string())
}
