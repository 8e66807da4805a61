//! Axum route handler for the streaming relay endpoint

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use http::{HeaderValue, Method, StatusCode, header};
use relay_config::UpstreamConfig;
use secrecy::SecretString;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::ChatError;
use crate::framing::LineBuffer;
use crate::types::ChatRequest;
use crate::upstream::UpstreamClient;

/// Upper bound on the inbound request body
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Channel capacity between the forwarding loop and the response body
const FORWARD_BUFFER: usize = 64;

/// Shared state for the relay route
///
/// Built once at startup; per-request buffers live in the handler, so
/// concurrent invocations share nothing mutable.
#[derive(Clone)]
pub struct ChatState {
    inner: Arc<ChatStateInner>,
}

struct ChatStateInner {
    upstream: UpstreamClient,
    api_key: Option<SecretString>,
    idle_timeout: Option<Duration>,
}

impl ChatState {
    /// Create relay state from upstream configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured idle timeout is not a valid
    /// duration string
    pub fn from_config(config: &UpstreamConfig) -> anyhow::Result<Self> {
        Ok(Self {
            inner: Arc::new(ChatStateInner {
                upstream: UpstreamClient::new(config),
                api_key: config.api_key.clone(),
                idle_timeout: config.idle_timeout_duration()?,
            }),
        })
    }
}

/// Build the relay router
///
/// The route is registered for any method: the handler performs its own
/// method dispatch so non-POST requests receive the structured 405 body
/// rather than axum's empty default.
pub fn chat_router(state: ChatState) -> Router {
    Router::new()
        .route("/api/stream-chat", routing::any(stream_chat))
        .with_state(state)
}

/// Handle requests to the relay endpoint
async fn stream_chat(State(state): State<ChatState>, request: Request) -> Response {
    // Preflight short-circuits everything else; the CORS layer stamps the
    // permission headers on the way out
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    if request.method() != Method::POST {
        return error_response(&ChatError::MethodNotAllowed);
    }

    match relay(&state, request).await {
        Ok(response) => response,
        Err(e) => {
            if matches!(e, ChatError::Proxy(_)) {
                tracing::error!(error = %e, "relay failed before the response was committed");
            }
            error_response(&e)
        }
    }
}

/// Relay one POST request upstream and stream the reply back
async fn relay(state: &ChatState, request: Request) -> Result<Response, ChatError> {
    let api_key = state.inner.api_key.clone().ok_or(ChatError::MissingCredential)?;

    // Suspends until the transport has delivered the body in full
    let body = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| ChatError::Proxy(e.to_string()))?;

    let chat_request = ChatRequest::from_json_bytes(&body)?;

    // The idle timeout also bounds the wait for upstream response headers,
    // so a silent upstream fails before anything is committed
    let upstream_call = state.inner.upstream.stream_chat(&api_key, &chat_request.messages);
    let response = match state.inner.idle_timeout {
        Some(limit) => tokio::time::timeout(limit, upstream_call)
            .await
            .map_err(|_| ChatError::Proxy("upstream request timed out".to_owned()))??,
        None => upstream_call.await?,
    };

    let status = response.status();
    if !status.is_success() {
        // Relay the rejection verbatim: original status, raw body, no
        // event-stream framing
        let body = response.text().await.map_err(|e| ChatError::Proxy(e.to_string()))?;
        tracing::warn!(%status, "upstream declined the request");
        return Ok((status, body).into_response());
    }

    Ok(stream_response(Box::pin(response.bytes_stream()), state.inner.idle_timeout))
}

/// Build the caller-facing event-stream response and spawn the forwarding
/// loop behind it
///
/// Headers are committed before the first upstream chunk arrives; each body
/// frame is flushed as it is written.
fn stream_response(
    upstream: impl Stream<Item = reqwest::Result<Bytes>> + Unpin + Send + 'static,
    idle_timeout: Option<Duration>,
) -> Response {
    let (tx, rx) = mpsc::channel(FORWARD_BUFFER);
    tokio::spawn(forward_lines(upstream, tx, idle_timeout));

    let mut response = Response::new(Body::from_stream(ReceiverStream::new(rx)));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    response
}

/// Forward the upstream byte stream line by line
///
/// Complete lines are sent the moment they decode; the trailing partial
/// line, if any, is flushed once the upstream finishes. A send failure means
/// the caller disconnected, which ends the loop. Errors sent through the
/// channel terminate the committed response without further framing.
async fn forward_lines(
    mut upstream: impl Stream<Item = reqwest::Result<Bytes>> + Unpin,
    tx: mpsc::Sender<Result<Bytes, ChatError>>,
    idle_timeout: Option<Duration>,
) {
    let mut buffer = LineBuffer::new();

    loop {
        let chunk = match next_chunk(&mut upstream, idle_timeout).await {
            Ok(Some(Ok(chunk))) => chunk,
            Ok(Some(Err(e))) => {
                tracing::error!(error = %e, "upstream stream failed mid-flight");
                let _ = tx.send(Err(ChatError::Streaming(e.to_string()))).await;
                return;
            }
            Ok(None) => break,
            Err(_elapsed) => {
                tracing::error!("upstream stream stalled past the idle timeout");
                let _ = tx.send(Err(ChatError::Streaming("upstream idle timeout".to_owned()))).await;
                return;
            }
        };

        for line in buffer.push(&chunk) {
            if tx.send(Ok(Bytes::from(line))).await.is_err() {
                return;
            }
        }
    }

    if let Some(tail) = buffer.finish() {
        let _ = tx.send(Ok(Bytes::from(tail))).await;
    }
}

/// Wait for the next upstream chunk, bounded by the idle timeout when set
async fn next_chunk<S>(
    upstream: &mut S,
    idle_timeout: Option<Duration>,
) -> Result<Option<reqwest::Result<Bytes>>, tokio::time::error::Elapsed>
where
    S: Stream<Item = reqwest::Result<Bytes>> + Unpin,
{
    match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, upstream.next()).await,
        None => Ok(upstream.next().await),
    }
}

/// Render a relay error as the structured JSON failure body
fn error_response(error: &ChatError) -> Response {
    let body = match error {
        ChatError::Proxy(detail) => serde_json::json!({
            "error": error.client_message(),
            "message": detail,
        }),
        other => serde_json::json!({ "error": other.client_message() }),
    };

    (error.status_code(), Json(body)).into_response()
}
