//! Test utilities for session module tests

use async_trait::async_trait;
use http::header::{COOKIE, HeaderMap, HeaderValue, SET_COOKIE};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::storage::{InMemorySessionStore, SessionData, SessionStore, StorageError};

use super::cookie::CookieHandler;
use super::manager::SessionManager;

pub(crate) const TEST_MAX_AGE: Duration = Duration::from_secs(30 * 60);
pub(crate) const TEST_SWEEP_INTERVAL: Duration = Duration::from_secs(10);

/// In-memory store that counts calls per operation
pub(crate) struct CountingStore {
    pub(crate) inner: InMemorySessionStore,
    gets: AtomicUsize,
    sets: AtomicUsize,
    merges: AtomicUsize,
    takes: AtomicUsize,
    destroys: AtomicUsize,
}

impl CountingStore {
    pub(crate) fn new() -> Self {
        Self {
            inner: InMemorySessionStore::new(TEST_MAX_AGE, TEST_SWEEP_INTERVAL),
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
            merges: AtomicUsize::new(0),
            takes: AtomicUsize::new(0),
            destroys: AtomicUsize::new(0),
        }
    }

    pub(crate) fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub(crate) fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub(crate) fn merges(&self) -> usize {
        self.merges.load(Ordering::SeqCst)
    }

    pub(crate) fn takes(&self) -> usize {
        self.takes.load(Ordering::SeqCst)
    }

    pub(crate) fn destroys(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }

    /// Calls that mutate the store
    pub(crate) fn writes(&self) -> usize {
        self.sets() + self.merges() + self.destroys()
    }
}

#[async_trait]
impl SessionStore for CountingStore {
    async fn init(&self) -> Result<(), StorageError> {
        self.inner.init().await
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, StorageError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(session_id).await
    }

    async fn set(&self, session_id: &str, data: SessionData) -> Result<(), StorageError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(session_id, data).await
    }

    async fn merge(&self, session_id: &str, data: SessionData) -> Result<(), StorageError> {
        self.merges.fetch_add(1, Ordering::SeqCst);
        self.inner.merge(session_id, data).await
    }

    async fn take(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StorageError> {
        self.takes.fetch_add(1, Ordering::SeqCst);
        self.inner.take(session_id, key).await
    }

    async fn destroy(&self, session_id: &str) -> Result<(), StorageError> {
        self.destroys.fetch_add(1, Ordering::SeqCst);
        self.inner.destroy(session_id).await
    }

    async fn shutdown(&self) {
        self.inner.shutdown().await
    }
}

/// Store whose every backend operation fails
pub(crate) struct FailingStore;

#[async_trait]
impl SessionStore for FailingStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn get(&self, _session_id: &str) -> Result<Option<SessionData>, StorageError> {
        Err(StorageError::Storage("backend unavailable".to_string()))
    }

    async fn set(&self, _session_id: &str, _data: SessionData) -> Result<(), StorageError> {
        Err(StorageError::Storage("backend unavailable".to_string()))
    }

    async fn merge(&self, _session_id: &str, _data: SessionData) -> Result<(), StorageError> {
        Err(StorageError::Storage("backend unavailable".to_string()))
    }

    async fn take(
        &self,
        _session_id: &str,
        _key: &str,
    ) -> Result<Option<serde_json::Value>, StorageError> {
        Err(StorageError::Storage("backend unavailable".to_string()))
    }

    async fn destroy(&self, _session_id: &str) -> Result<(), StorageError> {
        Err(StorageError::Storage("backend unavailable".to_string()))
    }
}

/// In-memory store that yields to the scheduler before every operation,
/// so concurrent tasks interleave between store calls.
pub(crate) struct YieldingStore {
    pub(crate) inner: InMemorySessionStore,
}

#[async_trait]
impl SessionStore for YieldingStore {
    async fn init(&self) -> Result<(), StorageError> {
        self.inner.init().await
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, StorageError> {
        tokio::task::yield_now().await;
        self.inner.get(session_id).await
    }

    async fn set(&self, session_id: &str, data: SessionData) -> Result<(), StorageError> {
        tokio::task::yield_now().await;
        self.inner.set(session_id, data).await
    }

    async fn merge(&self, session_id: &str, data: SessionData) -> Result<(), StorageError> {
        tokio::task::yield_now().await;
        self.inner.merge(session_id, data).await
    }

    async fn take(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StorageError> {
        tokio::task::yield_now().await;
        self.inner.take(session_id, key).await
    }

    async fn destroy(&self, session_id: &str) -> Result<(), StorageError> {
        tokio::task::yield_now().await;
        self.inner.destroy(session_id).await
    }

    async fn shutdown(&self) {
        self.inner.shutdown().await
    }
}

pub(crate) fn counting_manager() -> (SessionManager, Arc<CountingStore>) {
    let store = Arc::new(CountingStore::new());
    let manager = SessionManager::new(store.clone(), CookieHandler::default());
    (manager, store)
}

pub(crate) fn yielding_manager() -> SessionManager {
    let store = YieldingStore {
        inner: InMemorySessionStore::new(TEST_MAX_AGE, TEST_SWEEP_INTERVAL),
    };
    SessionManager::new(Arc::new(store), CookieHandler::default())
}

pub(crate) fn failing_manager() -> SessionManager {
    SessionManager::new(Arc::new(FailingStore), CookieHandler::default())
}

pub(crate) fn request_with_cookie_header(raw: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_str(raw).expect("test cookie header should be valid"),
    );
    headers
}

pub(crate) fn request_with_session(session_id: &str) -> HeaderMap {
    request_with_cookie_header(&format!("nextSession={session_id}"))
}

pub(crate) fn set_cookie_headers(response: &HeaderMap) -> Vec<String> {
    response
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

pub(crate) fn is_clearing_cookie(cookie: &str) -> bool {
    cookie.starts_with("nextSession=;") && cookie.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT")
}

/// Session id the last non-clearing `Set-Cookie` header hands to the client
pub(crate) fn session_cookie_value(response: &HeaderMap) -> Option<String> {
    set_cookie_headers(response)
        .iter()
        .rev()
        .filter(|cookie| !is_clearing_cookie(cookie))
        .find_map(|cookie| {
            let pair = cookie.split(';').next()?;
            let value = pair.strip_prefix("nextSession=")?;
            (!value.is_empty()).then(|| value.to_string())
        })
}

/// Request a browser would send after receiving `response`
pub(crate) fn follow_up_request(response: &HeaderMap) -> HeaderMap {
    match session_cookie_value(response) {
        Some(id) => request_with_session(&id),
        None => HeaderMap::new(),
    }
}

pub(crate) fn json_map(value: serde_json::Value) -> SessionData {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
