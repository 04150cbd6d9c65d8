use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::storage::errors::StorageError;
use crate::storage::types::{SessionData, validate_session_id};

use super::types::{RedisSessionStore, SessionStore};

const SESSION_PREFIX: &str = "session";

// Each session is a hash: one JSON-encoded value per data key, plus a marker
// field so that a session with no data still exists.
const FIELD_PREFIX: &str = "d:";
const LIVE_FIELD: &str = "live";

impl RedisSessionStore {
    /// Create a store for the server at `url`; records expire after `ttl` of inactivity.
    pub fn new(url: &str, ttl: Duration) -> Result<Self, StorageError> {
        let client = redis::Client::open(url)?;
        Ok(Self { client, ttl })
    }

    fn make_key(session_id: &str) -> String {
        format!("{SESSION_PREFIX}:{session_id}")
    }

    fn ttl_secs(&self) -> i64 {
        self.ttl.as_secs().max(1) as i64
    }
}

fn data_field(key: &str) -> String {
    format!("{FIELD_PREFIX}{key}")
}

/// Hash fields for `data`, marker included.
fn encode_fields(data: &SessionData) -> Result<Vec<(String, String)>, StorageError> {
    let mut fields = Vec::with_capacity(data.len() + 1);
    fields.push((LIVE_FIELD.to_string(), "1".to_string()));
    for (key, value) in data {
        fields.push((data_field(key), serde_json::to_string(value)?));
    }
    Ok(fields)
}

/// Session data from a `HGETALL` reply. An empty reply means no record.
fn decode_fields(fields: HashMap<String, String>) -> Result<Option<SessionData>, StorageError> {
    if fields.is_empty() {
        return Ok(None);
    }
    let mut data = SessionData::new();
    for (field, raw) in fields {
        if let Some(key) = field.strip_prefix(FIELD_PREFIX) {
            data.insert(key.to_string(), serde_json::from_str(&raw)?);
        }
    }
    Ok(Some(data))
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn init(&self) -> Result<(), StorageError> {
        // Verify the connection works
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, StorageError> {
        validate_session_id(session_id)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = Self::make_key(session_id);
        let (fields,): (HashMap<String, String>,) = redis::pipe()
            .atomic()
            .hgetall(&key)
            .expire(&key, self.ttl_secs())
            .ignore()
            .query_async(&mut conn)
            .await?;

        decode_fields(fields)
    }

    async fn set(&self, session_id: &str, data: SessionData) -> Result<(), StorageError> {
        validate_session_id(session_id)?;
        let fields = encode_fields(&data)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = Self::make_key(session_id);
        let _: () = redis::pipe()
            .atomic()
            .del(&key)
            .ignore()
            .hset_multiple(&key, &fields[..])
            .ignore()
            .expire(&key, self.ttl_secs())
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn merge(&self, session_id: &str, data: SessionData) -> Result<(), StorageError> {
        validate_session_id(session_id)?;
        let fields = encode_fields(&data)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // HSET only touches the given fields; an expired key is recreated from the patch alone
        let key = Self::make_key(session_id);
        let _: () = redis::pipe()
            .atomic()
            .hset_multiple(&key, &fields[..])
            .ignore()
            .expire(&key, self.ttl_secs())
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn take(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StorageError> {
        validate_session_id(session_id)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let redis_key = Self::make_key(session_id);
        let field = data_field(key);
        let (raw,): (Option<String>,) = redis::pipe()
            .atomic()
            .hget(&redis_key, &field)
            .hdel(&redis_key, &field)
            .ignore()
            .expire(&redis_key, self.ttl_secs())
            .ignore()
            .query_async(&mut conn)
            .await?;

        raw.map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(StorageError::from)
    }

    async fn destroy(&self, session_id: &str) -> Result<(), StorageError> {
        validate_session_id(session_id)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = Self::make_key(session_id);
        let _: () = redis::cmd("DEL").arg(&key).query_async(&mut conn).await?;
        Ok(())
    }
}
