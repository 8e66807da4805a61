//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use relay_config::{Config, CorsConfig, HealthConfig, ServerConfig, UpstreamConfig};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults and a test credential
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                    cors: None,
                },
                upstream: UpstreamConfig {
                    api_key: Some(SecretString::from("test-key")),
                    base_url: None,
                    model: "test-model".to_owned(),
                    idle_timeout: None,
                },
            },
        }
    }

    /// Point the relay at a mock upstream
    pub fn with_upstream(mut self, base_url: &str) -> Self {
        self.config.upstream.base_url = Some(base_url.parse().expect("valid URL"));
        self
    }

    /// Remove the upstream credential
    pub fn without_api_key(mut self) -> Self {
        self.config.upstream.api_key = None;
        self
    }

    /// Bound upstream silence with an idle timeout
    pub fn with_idle_timeout(mut self, value: &str) -> Self {
        self.config.upstream.idle_timeout = Some(value.to_owned());
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
