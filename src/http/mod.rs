//! HTTP server module with TLS support.
//!
//! This module provides the listener plumbing around the serving pipeline:
//! - **None**: Plain HTTP
//! - **Self-signed**: Locally generated certificate, cached per user
//! - **Manual**: Operator-provided self-contained PEM file
//! - **ACME**: Automatic certificate provisioning via Let's Encrypt
//!
//! The server includes:
//! - HTTP to HTTPS redirect (when TLS enabled)
//! - Graceful shutdown on SIGTERM/SIGINT
//! - Certificate hot-reload via SIGHUP (fixed-certificate mode)

mod redirect;
mod server;
mod shutdown;
pub mod tls;

pub use server::{start_server, ServerError};
