use std::sync::Arc;

use crate::config::{SessionConfig, StoreConfig};
use crate::storage::errors::StorageError;

use super::types::{InMemorySessionStore, RedisSessionStore, SessionStore};

/// Build and initialize the store backend selected by `config.store`.
pub async fn create_session_store(
    config: &SessionConfig,
) -> Result<Arc<dyn SessionStore>, StorageError> {
    let store: Arc<dyn SessionStore> = match &config.store {
        StoreConfig::Memory => Arc::new(InMemorySessionStore::new(
            config.max_session_age,
            config.sweep_interval,
        )),
        StoreConfig::Redis { url } => {
            tracing::info!("Initializing redis session store");
            Arc::new(RedisSessionStore::new(url, config.max_session_age)?)
        }
    };

    if let Err(e) = store.init().await {
        tracing::error!("Failed to initialize session store: {}", e);
        return Err(e);
    }
    Ok(store)
}
