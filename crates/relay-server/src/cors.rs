use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::{HeaderValue, Method, StatusCode, header};
use relay_config::CorsConfig;

/// Cross-origin header values stamped on every response
#[derive(Debug)]
pub struct CorsHeaders {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

/// Build the response header set from configuration
///
/// # Errors
///
/// Returns an error if a configured value is not a valid header value
pub fn response_headers(config: Option<&CorsConfig>) -> anyhow::Result<Arc<CorsHeaders>> {
    let config = config.cloned().unwrap_or_default();

    Ok(Arc::new(CorsHeaders {
        allow_origin: parse_value("cors.allow_origin", &config.allow_origin)?,
        allow_methods: parse_value("cors.allow_methods", &config.allow_methods)?,
        allow_headers: parse_value("cors.allow_headers", &config.allow_headers)?,
    }))
}

fn parse_value(name: &str, value: &str) -> anyhow::Result<HeaderValue> {
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid {name} value '{value}': {e}"))
}

/// Stamp cross-origin headers on every response, answering preflight
/// requests immediately with an empty success on any path
pub async fn cors_middleware(headers: &CorsHeaders, request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return apply(StatusCode::OK.into_response(), headers);
    }

    apply(next.run(request).await, headers)
}

fn apply(mut response: Response, headers: &CorsHeaders) -> Response {
    let map = response.headers_mut();
    map.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, headers.allow_origin.clone());
    map.insert(header::ACCESS_CONTROL_ALLOW_METHODS, headers.allow_methods.clone());
    map.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, headers.allow_headers.clone());
    response
}
