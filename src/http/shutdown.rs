//! Signal handling: graceful shutdown and certificate reload.
//!
//! SIGINT/SIGTERM drain in-flight connections before the process exits;
//! SIGHUP re-reads the fixed-certificate PEM without a restart.

use std::path::PathBuf;
use std::time::Duration;

use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;

/// How long in-flight connections get to finish after a shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Install the SIGINT/SIGTERM handler.
///
/// On the first signal the handle stops accepting new connections and gives
/// in-flight ones up to [`DRAIN_TIMEOUT`] to complete.
pub fn setup_shutdown_handler(handle: Handle) {
    tokio::spawn(async move {
        wait_for_termination().await;
        tracing::info!(
            timeout_secs = DRAIN_TIMEOUT.as_secs(),
            "Shutdown signal received, draining connections"
        );
        handle.graceful_shutdown(Some(DRAIN_TIMEOUT));
    });
}

async fn wait_for_termination() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

/// Install the SIGHUP handler that reloads the self-contained PEM file
/// (fixed-certificate mode only).
///
/// A reload failure keeps the previously loaded certificate.
#[cfg(unix)]
pub fn setup_reload_handler(tls_config: RustlsConfig, pem_path: PathBuf) {
    tokio::spawn(async move {
        let mut sighup = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup())
            .expect("Failed to install SIGHUP handler");

        loop {
            sighup.recv().await;

            match tls_config.reload_from_pem_file(&pem_path, &pem_path).await {
                Ok(()) => {
                    tracing::info!(cert = %pem_path.display(), "Reloaded TLS certificate");
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        cert = %pem_path.display(),
                        "Failed to reload TLS certificate, keeping the previous one"
                    );
                }
            }
        }
    });
}

#[cfg(not(unix))]
pub fn setup_reload_handler(_tls_config: RustlsConfig, _pem_path: PathBuf) {
    tracing::warn!("Certificate hot-reload via SIGHUP not supported on this platform");
}
