//! dirserve: a tiny HTTP static-file and directory-listing server.
//!
//! Serves a root directory over HTTP, renders browsable directory listings
//! (with index-file short-circuiting), and optionally terminates TLS with a
//! self-signed, operator-provided, or ACME-issued certificate. When TLS is
//! active, plaintext traffic is redirected to HTTPS.

pub mod config;
pub mod error;
pub mod http;
pub mod listing;
pub mod middleware;
pub mod resolve;
pub mod routes;
pub mod state;
pub mod templates;

pub use config::{ConfigError, ServerConfig};
pub use routes::create_router;
pub use state::AppState;
