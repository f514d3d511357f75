use crate::config::ServerConfig;
use docbridge::DocumentStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Store handle (shared across requests)
    pub store: Arc<dyn DocumentStore>,
}

impl ServerState {
    /// Create new server state around an already-built store.
    pub fn new(config: ServerConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// Build the store named by `config.store` and wrap it in server state.
    pub async fn from_config(config: ServerConfig) -> anyhow::Result<Self> {
        let store = config.store.build().await?;
        Ok(Self::new(config, store))
    }
}
