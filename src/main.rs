//! dirserve: a tiny HTTP static-file and directory-listing server.
//!
//! This is the application entry point. It initializes tracing, resolves
//! command-line flags into the immutable server configuration, sets up the
//! Axum router, and starts the HTTP (and optionally HTTPS) listeners.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dirserve::config::{ServerConfig, DEFAULT_HTTP_PORT, DEFAULT_LOG_FILTER};
use dirserve::http::start_server;
use dirserve::routes::create_router;
use dirserve::state::AppState;
use dirserve::templates::init_templates;

/// dirserve: serve a directory over HTTP(S)
#[derive(Parser, Debug)]
#[command(name = "dirserve", version, about)]
struct Args {
    /// Directory to serve (defaults to the current working directory)
    #[arg(default_value = ".")]
    root: PathBuf,

    /// HTTP bind port
    #[arg(short, long, default_value_t = DEFAULT_HTTP_PORT)]
    port: u16,

    /// Serve HTTPS with a self-signed certificate
    #[arg(long)]
    self_signed: bool,

    /// Serve HTTPS with an ACME-issued certificate for this domain
    #[arg(long, value_name = "DOMAIN")]
    acme_domain: Option<String>,

    /// Serve HTTPS with this self-contained PEM file (certificate + key)
    #[arg(long, value_name = "FILE")]
    cert: Option<PathBuf>,

    /// HTTPS bind port (default 443, or 4433 with --self-signed)
    #[arg(long)]
    https_port: Option<u16>,

    /// UI language for directory listings (en, de, fr, es)
    #[arg(long, default_value = "en")]
    lang: String,

    /// Log level filter (e.g., "dirserve=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Resolve and validate configuration; conflicting TLS flags, a bad
    // ACME port, or an unknown language code all fail here, before any
    // socket is bound.
    let config = ServerConfig::resolve(
        args.root,
        args.port,
        args.self_signed,
        args.acme_domain,
        args.cert,
        args.https_port,
        &args.lang,
    )?;

    tracing::info!(
        root = %config.root.display(),
        http_port = config.http_port,
        tls = ?config.tls,
        "Loaded configuration"
    );

    let tera = init_templates()?;

    let state = AppState::new(config.clone(), tera);
    let app = create_router(state);

    start_server(app, &config).await?;

    Ok(())
}
