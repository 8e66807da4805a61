use std::path::Path;

use secrecy::SecretString;

use crate::Config;

/// Environment variable consulted when the config file does not set
/// `upstream.api_key`
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Applies the environment fallback for the upstream credential, then
    /// validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, TOML parsing fails, or
    /// validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let config = Self::from_toml(&raw)?;

        Ok(config)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if TOML parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let mut config: Self = toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.apply_env_fallback();
        config.validate()?;

        Ok(config)
    }

    /// Build a configuration without a file: defaults plus the environment
    /// credential
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_fallback();
        config
    }

    fn apply_env_fallback(&mut self) {
        if self.upstream.api_key.is_none()
            && let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            self.upstream.api_key = Some(SecretString::from(key));
        }
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream base URL or model is invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(ref url) = self.upstream.base_url
            && !matches!(url.scheme(), "http" | "https")
        {
            anyhow::bail!("upstream.base_url must be http or https, got '{}'", url.scheme());
        }

        if self.upstream.model.is_empty() {
            anyhow::bail!("upstream.model must not be empty");
        }

        self.upstream.idle_timeout_duration()?;

        Ok(())
    }
}
