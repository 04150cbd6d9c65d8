use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

use crate::storage::errors::StorageError;
use crate::storage::types::{SessionData, validate_session_id};

use super::types::{InMemorySessionStore, SessionStore, StoredRecord};

impl StoredRecord {
    fn new(data: SessionData) -> Self {
        Self {
            last_touched: Instant::now(),
            data,
        }
    }

    fn touch(&mut self) {
        self.last_touched = Instant::now();
    }

    fn is_expired(&self, max_age: Duration) -> bool {
        self.last_touched.elapsed() > max_age
    }
}

impl InMemorySessionStore {
    /// Create a store whose records expire after `max_age` of inactivity.
    ///
    /// The sweep task is spawned on the current tokio runtime. Outside a runtime
    /// the store still works, expired records are then only dropped when read.
    pub fn new(max_age: Duration, sweep_interval: Duration) -> Self {
        tracing::info!(
            ?max_age,
            ?sweep_interval,
            "Creating new in-memory session store"
        );

        let entries = Arc::new(DashMap::new());
        let sweeper = match tokio::runtime::Handle::try_current() {
            Ok(handle) => Some(handle.spawn(sweep_loop(
                Arc::downgrade(&entries),
                max_age,
                sweep_interval,
            ))),
            Err(_) => {
                tracing::warn!("No tokio runtime available, expiry sweep disabled");
                None
            }
        };

        Self {
            entries,
            max_age,
            sweeper,
        }
    }

    /// Number of records currently held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every record idle for longer than `max_age`. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        sweep_expired(&self.entries, self.max_age)
    }
}

impl Drop for InMemorySessionStore {
    fn drop(&mut self) {
        if let Some(handle) = &self.sweeper {
            handle.abort();
        }
    }
}

fn sweep_expired(entries: &DashMap<String, StoredRecord>, max_age: Duration) -> usize {
    let mut removed = 0;
    entries.retain(|_, record| {
        let keep = !record.is_expired(max_age);
        if !keep {
            removed += 1;
        }
        keep
    });
    removed
}

async fn sweep_loop(
    entries: Weak<DashMap<String, StoredRecord>>,
    max_age: Duration,
    sweep_interval: Duration,
) {
    let mut interval = tokio::time::interval(sweep_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;
        let Some(entries) = entries.upgrade() else {
            break;
        };
        let removed = sweep_expired(&entries, max_age);
        if removed > 0 {
            tracing::debug!(removed, remaining = entries.len(), "Swept expired sessions");
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, StorageError> {
        validate_session_id(session_id)?;

        match self.entries.get_mut(session_id) {
            None => return Ok(None),
            Some(mut record) if !record.is_expired(self.max_age) => {
                record.touch();
                return Ok(Some(record.data.clone()));
            }
            Some(_) => {}
        }

        // Idle past max_age but not swept yet
        self.entries
            .remove_if(session_id, |_, record| record.is_expired(self.max_age));
        Ok(None)
    }

    async fn set(&self, session_id: &str, data: SessionData) -> Result<(), StorageError> {
        validate_session_id(session_id)?;
        self.entries
            .insert(session_id.to_string(), StoredRecord::new(data));
        Ok(())
    }

    async fn merge(&self, session_id: &str, data: SessionData) -> Result<(), StorageError> {
        validate_session_id(session_id)?;

        match self.entries.entry(session_id.to_string()) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                if record.is_expired(self.max_age) {
                    record.data = data;
                } else {
                    record.data.extend(data);
                }
                record.touch();
            }
            Entry::Vacant(entry) => {
                entry.insert(StoredRecord::new(data));
            }
        }
        Ok(())
    }

    async fn take(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StorageError> {
        validate_session_id(session_id)?;

        // The shard stays locked from lookup to removal
        match self.entries.get_mut(session_id) {
            Some(mut record) if !record.is_expired(self.max_age) => {
                record.touch();
                Ok(record.data.remove(key))
            }
            _ => Ok(None),
        }
    }

    async fn destroy(&self, session_id: &str) -> Result<(), StorageError> {
        validate_session_id(session_id)?;
        self.entries.remove(session_id);
        Ok(())
    }

    async fn shutdown(&self) {
        if let Some(handle) = &self.sweeper {
            tracing::debug!("Stopping in-memory session sweep");
            handle.abort();
        }
    }
}
