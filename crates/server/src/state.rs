//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::Repositories;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the repositories and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    repositories: Repositories,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `repositories` - Record store adapters (`PostgreSQL` or in-memory)
    #[must_use]
    pub fn new(config: ServerConfig, repositories: Repositories) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                repositories,
            }),
        }
    }

    /// State over a fresh in-memory store with default configuration.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(ServerConfig::in_memory(), Repositories::in_memory())
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the repositories.
    #[must_use]
    pub fn repositories(&self) -> &Repositories {
        &self.inner.repositories
    }
}
