//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! hub is the only mutable state and guards itself; the config is read-only
//! after startup.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::registry::InMemoryRegistry;
use crate::services::hub::Hub;

/// Clone is required by Axum; both fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Hub>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// State over a fresh in-memory registry.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            hub: Arc::new(Hub::new(Box::new(InMemoryRegistry::new()))),
            config: Arc::new(config),
        }
    }
}
