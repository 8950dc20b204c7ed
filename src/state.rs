//! Shared application state for request handlers.

use std::sync::Arc;
use tera::Tera;

use crate::config::ServerConfig;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Holds the immutable server configuration and the Tera template engine.
/// Request handling is otherwise stateless: handlers only read this state
/// and the filesystem.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub tera: Arc<Tera>,
}

impl AppState {
    /// Creates a new application state from the given configuration and templates.
    pub fn new(config: ServerConfig, tera: Tera) -> Self {
        Self {
            config: Arc::new(config),
            tera: Arc::new(tera),
        }
    }
}
