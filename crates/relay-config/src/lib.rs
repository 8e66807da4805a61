#![allow(clippy::must_use_candidate)]

mod loader;
pub mod server;
pub mod upstream;

use serde::Deserialize;

pub use loader::API_KEY_ENV;
pub use server::{CorsConfig, HealthConfig, ServerConfig};
pub use upstream::UpstreamConfig;

/// Top-level relay configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream completion API configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,
}
