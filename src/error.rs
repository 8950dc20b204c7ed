//! Request error taxonomy and HTTP mapping.
//!
//! Every per-request failure maps to exactly one status code. The underlying
//! OS error text is logged but never rendered into the client body, so a 404
//! or 500 page cannot leak filesystem details.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Malformed request path: {0}")]
    Decode(String),

    #[error("Not found")]
    NotFound(#[source] io::Error),

    #[error("Failed to stat path: {0}")]
    Stat(#[source] io::Error),

    #[error("Failed to read directory: {0}")]
    ReadDir(#[source] io::Error),

    #[error("Template rendering error: {0}")]
    Render(#[from] tera::Error),

    #[error("Response construction error: {0}")]
    Http(#[from] axum::http::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match &self {
            AppError::NotFound(err) => {
                tracing::debug!(error = %err, "Resource not found");
            }
            _ => {
                tracing::error!(error = %self, "Request failed");
            }
        }

        let message = match status {
            StatusCode::NOT_FOUND => "Not Found",
            _ => "Internal Server Error",
        };

        let body = format!(
            r#"<!DOCTYPE html>
<html>
<head><title>Error {}</title></head>
<body>
<h1>Error {}</h1>
<p>{}</p>
</body>
</html>"#,
            status.as_u16(),
            status.as_u16(),
            message
        );

        (status, Html(body)).into_response()
    }
}
