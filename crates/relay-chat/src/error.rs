use http::StatusCode;
use thiserror::Error;

/// Errors that can occur while relaying a chat request
#[derive(Debug, Error)]
pub enum ChatError {
    /// No upstream credential available in process configuration
    #[error("GROQ_API_KEY not configured")]
    MissingCredential,

    /// Request body was not parseable JSON
    #[error("Invalid JSON body")]
    InvalidBody,

    /// Body parsed but lacks a valid `messages` array
    #[error("Missing or invalid \"messages\" array")]
    InvalidMessages,

    /// Request used a method other than POST
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Upstream call or relay failed before the response was committed
    #[error("Proxy error: {0}")]
    Proxy(String),

    /// Failure after the event stream was committed
    ///
    /// Never rendered as a JSON body; surfaced by terminating the
    /// in-progress connection.
    #[error("streaming error: {0}")]
    Streaming(String),
}

impl ChatError {
    /// HTTP status code for this error
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBody | Self::InvalidMessages => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingCredential | Self::Proxy(_) | Self::Streaming(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to expose to callers
    ///
    /// The proxy-failure detail travels in a separate field; everything else
    /// is the display form.
    pub fn client_message(&self) -> String {
        match self {
            Self::Proxy(_) => "Proxy error".to_owned(),
            other => other.to_string(),
        }
    }
}
