//! The request pipeline: resolve, classify, and respond.
//!
//! Every request flows through [`entry`]: the path resolver maps the URI
//! onto the served root, the resolved path is classified by a metadata
//! lookup, and the request branches to a trailing-slash redirect, an index
//! file, a rendered listing, or a streamed file. Errors short-circuit into
//! [`AppError`] responses at any stage.

use std::io;
use std::path::Path;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::error::AppError;
use crate::listing::{build_listing, find_index};
use crate::resolve;
use crate::state::AppState;
use crate::templates::render_listing;

/// Content type for listings and index files.
const HTML_CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// Fallback handler for every request path.
pub async fn entry(State(state): State<AppState>, uri: Uri) -> Result<Response, AppError> {
    let raw_path = uri.path();
    let resolved = resolve::resolve(&state.config.root, raw_path)?;

    let meta = tokio::fs::metadata(&resolved.fs_path)
        .await
        .map_err(classify_stat_error)?;

    if meta.is_dir() {
        // Relative links in a listing only work when the directory URL ends
        // in a slash, so redirect before enumerating anything.
        if !raw_path.ends_with('/') {
            let location = match uri.query() {
                Some(query) => format!("{raw_path}/?{query}"),
                None => format!("{raw_path}/"),
            };
            return Ok(found_redirect(&location));
        }
        serve_dir(&state, &resolved.fs_path, raw_path, resolved.request_path).await
    } else {
        serve_file(&resolved.fs_path, meta.len()).await
    }
}

/// Map a filesystem metadata error onto the request error taxonomy.
///
/// Missing paths and permission failures are a 404; anything else is a
/// stat failure and surfaces as a 500.
fn classify_stat_error(err: io::Error) -> AppError {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => AppError::NotFound(err),
        _ => AppError::Stat(err),
    }
}

/// Serve a directory: an index file verbatim if one exists, a rendered
/// listing otherwise. Never both.
async fn serve_dir(
    state: &AppState,
    dir: &Path,
    raw_path: &str,
    request_path: String,
) -> Result<Response, AppError> {
    if let Some(index) = find_index(dir).await {
        return serve_index(&index).await;
    }

    let listing = build_listing(dir, raw_path, request_path, state.config.locale.text()).await?;
    let html = render_listing(&state.tera, &listing, &state.config)?;

    Ok((
        [(header::CONTENT_TYPE, HTML_CONTENT_TYPE)],
        html,
    )
        .into_response())
}

/// Stream an index file verbatim with `text/html` and its exact byte size.
async fn serve_index(path: &Path) -> Result<Response, AppError> {
    let meta = tokio::fs::metadata(path).await.map_err(classify_stat_error)?;
    let file = File::open(path).await.map_err(classify_stat_error)?;

    Response::builder()
        .header(header::CONTENT_TYPE, HTML_CONTENT_TYPE)
        .header(header::CONTENT_LENGTH, meta.len())
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(AppError::from)
}

/// Stream a regular file in one pass, typed by extension lookup with an
/// `application/octet-stream` fallback.
async fn serve_file(path: &Path, size: u64) -> Result<Response, AppError> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let file = File::open(path).await.map_err(classify_stat_error)?;

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, size)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(AppError::from)
}

/// A 302 Found redirect to `location`.
fn found_redirect(location: &str) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::templates::init_templates;
    use std::path::PathBuf;

    fn state_for(root: PathBuf) -> AppState {
        let config =
            ServerConfig::resolve(root, 8000, false, None, None, None, "en").unwrap();
        AppState::new(config, init_templates().unwrap())
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path().to_path_buf());

        let err = entry(State(state), Uri::from_static("/missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn directory_without_trailing_slash_redirects() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/inner.txt"), b"x").unwrap();
        let state = state_for(dir.path().to_path_buf());

        let response = entry(State(state), Uri::from_static("/sub"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/sub/"
        );
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn redirect_preserves_query() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let state = state_for(dir.path().to_path_buf());

        let response = entry(State(state), Uri::from_static("/sub?a=1"))
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/sub/?a=1"
        );
    }

    #[tokio::test]
    async fn index_file_short_circuits_listing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<p>hello</p>").unwrap();
        std::fs::write(dir.path().join("other.txt"), b"ignored").unwrap();
        let state = state_for(dir.path().to_path_buf());

        let response = entry(State(state), Uri::from_static("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            HTML_CONTENT_TYPE
        );
        assert_eq!(
            response.headers().get(header::CONTENT_LENGTH).unwrap(),
            "12"
        );
        assert_eq!(body_bytes(response).await, b"<p>hello</p>");
    }

    #[tokio::test]
    async fn listing_renders_when_no_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"0123456789").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let state = state_for(dir.path().to_path_buf());

        let response = entry(State(state), Uri::from_static("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            HTML_CONTENT_TYPE
        );

        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains(r#"<a href="/a.txt">a.txt</a>"#));
        assert!(html.contains(r#"<a href="/sub/">sub/</a>"#));
        assert!(html.contains("Directory listing for /"));
    }

    #[tokio::test]
    async fn file_content_type_comes_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), b"body{}").unwrap();
        std::fs::write(dir.path().join("blob.unknownext"), b"\x00\x01").unwrap();
        let state = state_for(dir.path().to_path_buf());

        let response = entry(State(state.clone()), Uri::from_static("/style.css"))
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/css"
        );

        let response = entry(State(state), Uri::from_static("/blob.unknownext"))
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn file_round_trips_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        std::fs::write(dir.path().join("data.bin"), &payload).unwrap();
        let state = state_for(dir.path().to_path_buf());

        let response = entry(State(state), Uri::from_static("/data.bin"))
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_LENGTH).unwrap(),
            "10000"
        );
        assert_eq!(body_bytes(response).await, payload);
    }

    #[tokio::test]
    async fn traversal_stays_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("safe.txt"), b"inside").unwrap();
        let state = state_for(dir.path().to_path_buf());

        // Escaping segments collapse back to the root listing.
        let response = entry(State(state.clone()), Uri::from_static("/../../../"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("safe.txt"));

        // A traversal that names a real file outside the root stays a 404.
        let err = entry(State(state), Uri::from_static("/../../../../etc/passwd"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
