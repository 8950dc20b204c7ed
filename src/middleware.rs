//! Request middleware: outcome logging and common response headers.
//!
//! Each request gets a UUID v4 and a tracing span wrapping its whole
//! lifetime. On completion a structured outcome record is emitted (method,
//! path, remote address, user agent, status, duration). Records go to the
//! log sink only; nothing is retained in memory.

use std::net::SocketAddr;
use std::time::{Instant, SystemTime};

use axum::{
    extract::{ConnectInfo, Request},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::listing::format_http_date;

/// Extension type for accessing the request ID in handlers if needed.
#[derive(Clone, Debug)]
pub struct RequestId(pub Uuid);

/// Middleware that generates a request ID and logs the request outcome.
///
/// This should be the outermost middleware layer so the span wraps all
/// request processing, including other middleware and handlers.
pub async fn request_log_layer(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.to_string())
        .unwrap_or_default();
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    let start = Instant::now();

    let mut request = request;
    request.extensions_mut().insert(RequestId(request_id));

    async move {
        let response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            status = response.status().as_u16(),
            remote_addr = %remote_addr,
            user_agent = %user_agent,
            duration_ms,
            "Request completed"
        );

        response
    }
    .instrument(span)
    .await
}

/// Middleware that stamps every response with a `Date` header.
///
/// The value is the current time in HTTP-date form, set only if the handler
/// did not already provide one.
pub async fn date_header_layer(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    if !response.headers().contains_key(header::DATE) {
        if let Ok(value) = HeaderValue::from_str(&format_http_date(SystemTime::now())) {
            response.headers_mut().insert(header::DATE, value);
        }
    }

    response
}
