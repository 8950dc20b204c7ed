//! Router assembly.
//!
//! A single fallback route carries every request through the resolve →
//! classify → respond pipeline. Cross-cutting layers add the `Server` and
//! `Date` headers, wire-level tracing, the per-request outcome log, and the
//! panic boundary that converts any escaped failure into a 500 without
//! killing the listener.

pub mod serve;

use std::any::Any;

use axum::{body::Body, middleware, response::IntoResponse, routing::get, Router};
use http::header::{self, HeaderValue};
use http::{Response, StatusCode};
use tower_http::{
    catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use crate::config::SERVER_HEADER;
use crate::middleware::{date_header_layer, request_log_layer};
use crate::state::AppState;

/// Creates the Axum router with the serving pipeline and all layers.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .fallback(get(serve::entry))
        .with_state(state)
        // Last-resort boundary: a panic becomes a 500, the process keeps serving
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(SetResponseHeaderLayer::overriding(
            header::SERVER,
            HeaderValue::from_static(SERVER_HEADER),
        ))
        .layer(middleware::from_fn(date_header_layer))
        .layer(TraceLayer::new_for_http())
        // Request log middleware is outermost so its span wraps everything
        .layer(middleware::from_fn(request_log_layer))
}

/// Convert a caught panic into a 500 response carrying the failure text.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %details, "Recovered from panic in request handler");

    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from(details))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
