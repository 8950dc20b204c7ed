//! HTTP/HTTPS server startup logic.
//!
//! Supports four TLS modes:
//! - None: Plain HTTP
//! - Self-signed: Locally generated certificate, cached under `~/.autocert`
//! - Manual: Operator-provided self-contained PEM file
//! - ACME: Automatic Let's Encrypt certificates
//!
//! Whenever TLS is active, a second plaintext listener on the HTTP port
//! answers everything with a 302 to the HTTPS equivalent URL.

use std::net::SocketAddr;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use futures::StreamExt;
use rustls_acme::caches::DirCache;
use rustls_acme::AcmeConfig;

use crate::config::{ServerConfig, TlsMode};

use super::redirect;
use super::shutdown;
use super::tls;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to prepare certificate material: {0}")]
    Tls(#[from] tls::TlsError),

    #[error("Failed to load TLS configuration: {0}")]
    TlsConfig(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// Start the HTTP/HTTPS server based on configuration.
///
/// This function blocks until the server shuts down.
pub async fn start_server(app: Router, config: &ServerConfig) -> Result<(), ServerError> {
    let handle = Handle::new();
    shutdown::setup_shutdown_handler(handle.clone());

    match &config.tls {
        TlsMode::None => start_plain_server(app, config.http_port, handle).await,
        TlsMode::SelfSigned => start_self_signed_server(app, config, handle).await,
        TlsMode::Manual { pem_path } => {
            start_manual_tls_server(app, config, pem_path.clone(), handle).await
        }
        TlsMode::Acme { domain } => start_acme_server(app, config, domain.clone(), handle).await,
    }
}

/// Start a plain HTTP server (no TLS).
async fn start_plain_server(app: Router, port: u16, handle: Handle) -> Result<(), ServerError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Serving HTTP");

    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))
}

/// Start an HTTPS server with a cached (or freshly generated) self-signed
/// certificate.
async fn start_self_signed_server(
    app: Router,
    config: &ServerConfig,
    handle: Handle,
) -> Result<(), ServerError> {
    let cache_dir = tls::certificate_cache_dir()?;
    let paths = tls::ensure_self_signed(&cache_dir)?;

    let rustls_config = RustlsConfig::from_pem_file(&paths.cert, &paths.key)
        .await
        .map_err(|e| ServerError::TlsConfig(format!("Failed to load certificates: {}", e)))?;

    redirect::spawn_redirect_server(config.http_port, config.https_port);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.https_port));
    tracing::info!(%addr, cache = %cache_dir.display(), "Serving HTTPS (self-signed)");

    axum_server::bind_rustls(addr, rustls_config)
        .handle(handle)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))
}

/// Start an HTTPS server with an operator-provided certificate.
async fn start_manual_tls_server(
    app: Router,
    config: &ServerConfig,
    pem_path: std::path::PathBuf,
    handle: Handle,
) -> Result<(), ServerError> {
    // A single self-contained PEM carries both the chain and the key.
    let rustls_config = RustlsConfig::from_pem_file(&pem_path, &pem_path)
        .await
        .map_err(|e| {
            ServerError::TlsConfig(format!(
                "Failed to load certificate '{}': {}",
                pem_path.display(),
                e
            ))
        })?;

    shutdown::setup_reload_handler(rustls_config.clone(), pem_path.clone());
    redirect::spawn_redirect_server(config.http_port, config.https_port);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.https_port));
    tracing::info!(%addr, cert = %pem_path.display(), "Serving HTTPS (fixed certificate)");

    axum_server::bind_rustls(addr, rustls_config)
        .handle(handle)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))
}

/// Start an HTTPS server with automatic ACME (Let's Encrypt) certificates.
///
/// Certificate acquisition, caching and renewal are the ACME client's job;
/// this only wires its acceptor into the listener. The domain allow-list
/// contains exactly the operator-supplied domain, so the client rejects
/// handshakes for any other hostname.
async fn start_acme_server(
    app: Router,
    config: &ServerConfig,
    domain: String,
    handle: Handle,
) -> Result<(), ServerError> {
    let cache_dir = tls::certificate_cache_dir()?;
    std::fs::create_dir_all(&cache_dir).map_err(|e| {
        ServerError::TlsConfig(format!(
            "Failed to create ACME cache directory '{}': {}",
            cache_dir.display(),
            e
        ))
    })?;

    let mut acme_state = AcmeConfig::new([domain.clone()])
        .cache(DirCache::new(cache_dir.clone()))
        .directory_lets_encrypt(true)
        .state();

    let acceptor = acme_state.axum_acceptor(acme_state.default_rustls_config());

    // ACME event loop for certificate issuance and renewal
    tokio::spawn(async move {
        loop {
            match acme_state.next().await {
                Some(Ok(event)) => {
                    tracing::info!(event = ?event, "ACME event");
                }
                Some(Err(err)) => {
                    tracing::error!(error = %err, "ACME error");
                }
                None => {
                    tracing::debug!("ACME state stream ended");
                    break;
                }
            }
        }
    });

    redirect::spawn_redirect_server(config.http_port, config.https_port);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.https_port));
    tracing::info!(
        %addr,
        domain = %domain,
        cache = %cache_dir.display(),
        "Serving HTTPS (ACME)"
    );

    axum_server::bind(addr)
        .handle(handle)
        .acceptor(acceptor)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))
}
