//! Mock upstream completion API for integration tests
//!
//! Implements a minimal chat-completions endpoint that streams canned byte
//! chunks with caller-controlled boundaries

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use bytes::Bytes;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

/// Mock upstream that returns predictable responses
pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    completion_count: AtomicU32,
    /// Status and body returned instead of a stream (if set)
    reject: Option<(StatusCode, String)>,
    /// Byte chunks streamed to the relay, boundaries preserved
    chunks: Vec<Bytes>,
    /// Keep the connection open forever after the canned chunks
    stall: bool,
    /// Last request body received, for forwarding assertions
    last_request: Mutex<Option<serde_json::Value>>,
}

impl MockUpstream {
    /// Start a mock with a simple two-line canned stream
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with_chunks(vec![
            Bytes::from_static(b"data: {\"content\":\"Hello\"}\n\n"),
            Bytes::from_static(b"data: [DONE]\n"),
        ])
        .await
    }

    /// Start a mock that streams the given chunks, preserving their boundaries
    pub async fn start_with_chunks(chunks: Vec<Bytes>) -> anyhow::Result<Self> {
        Self::start_inner(None, chunks, false).await
    }

    /// Start a mock that rejects every request with the given status and body
    pub async fn start_rejecting(status: StatusCode, body: &str) -> anyhow::Result<Self> {
        Self::start_inner(Some((status, body.to_owned())), Vec::new(), false).await
    }

    /// Start a mock that sends the given chunks and then goes silent without
    /// ever ending the stream
    pub async fn start_stalling(chunks: Vec<Bytes>) -> anyhow::Result<Self> {
        Self::start_inner(None, chunks, true).await
    }

    async fn start_inner(
        reject: Option<(StatusCode, String)>,
        chunks: Vec<Bytes>,
        stall: bool,
    ) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            completion_count: AtomicU32::new(0),
            reject,
            chunks,
            stall,
            last_request: Mutex::new(None),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_completions))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as the upstream
    ///
    /// Includes `/v1` since the relay appends `/chat/completions`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Number of completion requests received
    pub fn completion_count(&self) -> u32 {
        self.state.completion_count.load(Ordering::Relaxed)
    }

    /// Body of the most recent completion request
    pub fn last_request(&self) -> Option<serde_json::Value> {
        self.state.last_request.lock().unwrap().clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_completions(
    State(state): State<Arc<MockState>>,
    Json(request): Json<serde_json::Value>,
) -> Response {
    state.completion_count.fetch_add(1, Ordering::Relaxed);
    *state.last_request.lock().unwrap() = Some(request);

    if let Some((status, body)) = &state.reject {
        return (*status, body.clone()).into_response();
    }

    let chunks: Vec<Result<Bytes, std::convert::Infallible>> =
        state.chunks.iter().cloned().map(Ok).collect();

    let body = if state.stall {
        Body::from_stream(futures_util::stream::iter(chunks).chain(futures_util::stream::pending()))
    } else {
        Body::from_stream(futures_util::stream::iter(chunks))
    };

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/event-stream")],
        body,
    )
        .into_response()
}
