use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::storage::errors::StorageError;
use crate::storage::types::SessionData;
use crate::utils::{RANDOM_TOKEN_BYTES, gen_random_string};

/// Process-local session store with sliding idle expiry.
///
/// Records live in a [`DashMap`], so each operation locks only the shard of
/// the key it touches. A background task owned by the store sweeps idle
/// records every `sweep_interval`; it stops on [`SessionStore::shutdown`] or
/// when the store is dropped.
pub struct InMemorySessionStore {
    pub(super) entries: Arc<DashMap<String, StoredRecord>>,
    pub(super) max_age: Duration,
    pub(super) sweeper: Option<JoinHandle<()>>,
}

pub(super) struct StoredRecord {
    pub(super) last_touched: Instant,
    pub(super) data: SessionData,
}

/// Session store backed by a Redis server; expiry is delegated to Redis TTLs.
pub struct RedisSessionStore {
    pub(super) client: redis::Client,
    pub(super) ttl: Duration,
}

/// Expiring key/value map from session id to session data.
///
/// "Not found" is never an error: [`SessionStore::get`] returns `Ok(None)` for
/// unknown and expired ids alike. Every read or write of a record restarts its
/// idle clock.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Verify the backend is usable. Called once when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Mint a fresh, unguessable session id. Pure generation, no backend access.
    fn id(&self) -> Result<String, StorageError> {
        gen_random_string(RANDOM_TOKEN_BYTES).map_err(|e| StorageError::Crypto(e.to_string()))
    }

    /// Fetch the data of a live record and refresh its idle clock.
    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, StorageError>;

    /// Create or wholesale replace a record.
    async fn set(&self, session_id: &str, data: SessionData) -> Result<(), StorageError>;

    /// Shallow-merge `data` into a record, creating it when absent.
    async fn merge(&self, session_id: &str, data: SessionData) -> Result<(), StorageError>;

    /// Remove `key` from a live record and return its value, as one indivisible step.
    ///
    /// Returns `None` when the record or the key is absent. The default goes
    /// through `get` and `set`; backends override it to make it atomic.
    async fn take(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StorageError> {
        let Some(mut data) = self.get(session_id).await? else {
            return Ok(None);
        };
        let value = data.remove(key);
        if value.is_some() {
            self.set(session_id, data).await?;
        }
        Ok(value)
    }

    /// Remove a record. Removing an unknown id succeeds.
    async fn destroy(&self, session_id: &str) -> Result<(), StorageError>;

    /// Stop any background work owned by the store.
    async fn shutdown(&self) {}
}
