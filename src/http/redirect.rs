//! HTTP to HTTPS redirect server.
//!
//! When TLS is active, the plain HTTP port answers every request with a
//! 302 to the HTTPS equivalent URL: same host, configured HTTPS port
//! (omitted when it is the default 443), same path and query.

use std::net::SocketAddr;

use axum::http::{header, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use axum_extra::extract::Host;

/// Spawn an HTTP server that redirects all requests to HTTPS.
///
/// This runs in the background and does not block.
pub fn spawn_redirect_server(http_port: u16, https_port: u16) {
    tokio::spawn(async move {
        let addr = SocketAddr::from(([0, 0, 0, 0], http_port));

        tracing::info!(
            http_port = %http_port,
            https_port = %https_port,
            "Starting HTTP->HTTPS redirect server"
        );

        let app = Router::new().fallback(any(move |Host(host): Host, uri: Uri| async move {
            redirect_to_https(&host, https_port, &uri)
        }));

        match axum_server::bind(addr)
            .serve(app.into_make_service())
            .await
        {
            Ok(()) => {
                tracing::debug!("HTTP redirect server stopped");
            }
            Err(e) => {
                tracing::error!(error = %e, "HTTP redirect server failed");
            }
        }
    });
}

/// Generate a 302 redirect response from HTTP to HTTPS.
fn redirect_to_https(host: &str, https_port: u16, uri: &Uri) -> Response {
    let location = https_location(host, https_port, uri);
    tracing::debug!(from = %uri, to = %location, "Redirecting HTTP to HTTPS");

    let mut response = StatusCode::FOUND.into_response();
    if let Ok(value) = HeaderValue::from_str(&location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}

/// Build the HTTPS equivalent of a plaintext request URL.
fn https_location(host: &str, https_port: u16, uri: &Uri) -> String {
    // Remove port from host if present
    let host = host.split(':').next().unwrap_or(host);
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    if https_port == 443 {
        format!("https://{host}{path_and_query}")
    } else {
        format!("https://{host}:{https_port}{path_and_query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_port_is_omitted() {
        let uri: Uri = "/docs/a.txt?x=1".parse().unwrap();
        assert_eq!(
            https_location("example.org:8000", 443, &uri),
            "https://example.org/docs/a.txt?x=1"
        );
    }

    #[test]
    fn non_default_port_is_appended() {
        let uri: Uri = "/".parse().unwrap();
        assert_eq!(
            https_location("localhost:8000", 4433, &uri),
            "https://localhost:4433/"
        );
    }

    #[test]
    fn redirect_is_302_with_location() {
        let uri: Uri = "/file".parse().unwrap();
        let response = redirect_to_https("example.org", 443, &uri);
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://example.org/file"
        );
    }
}
