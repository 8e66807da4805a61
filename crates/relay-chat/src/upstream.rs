//! One-shot streaming client for the upstream completion API

use relay_config::UpstreamConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use url::Url;

use crate::error::ChatError;
use crate::types::ChatMessage;

/// Default Groq API base URL
const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Wire request for the upstream chat-completions endpoint
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// Client for the upstream chat-completion service
///
/// Issues exactly one streaming request per relay invocation; failures are
/// never retried.
pub struct UpstreamClient {
    client: Client,
    base_url: Url,
    model: String,
}

impl UpstreamClient {
    /// Create from upstream configuration
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded default base URL is invalid (should never happen)
    #[must_use]
    pub fn new(config: &UpstreamConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| Url::parse(DEFAULT_BASE_URL).expect("valid default URL"));

        Self {
            client: Client::new(),
            base_url,
            model: config.model.clone(),
        }
    }

    /// Model identifier sent with every relayed request
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the chat completions URL
    fn completions_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    /// Issue the streaming completion request
    ///
    /// The caller's messages are forwarded verbatim with the configured model
    /// and `stream: true`. Returns the raw upstream response so the caller
    /// can branch between the error-passthrough and streaming paths on its
    /// status.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Proxy`] if the request cannot be sent
    pub async fn stream_chat(
        &self,
        api_key: &SecretString,
        messages: &[ChatMessage],
    ) -> Result<reqwest::Response, ChatError> {
        let wire_request = CompletionRequest {
            model: &self.model,
            messages,
            stream: true,
        };

        self.client
            .post(self.completions_url())
            .bearer_auth(api_key.expose_secret())
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| ChatError::Proxy(e.to_string()))
    }
}
