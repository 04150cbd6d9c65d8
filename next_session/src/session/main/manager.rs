use std::sync::Arc;

use crate::config::SessionConfig;
use crate::session::errors::SessionError;
use crate::storage::{SessionStore, create_session_store};

use super::cookie::CookieHandler;

/// The configured store and cookie handler, created once per process and shared.
///
/// Every request-scoped operation takes the incoming request headers and the
/// outgoing response headers; cookies are read from the former and
/// `Set-Cookie` headers are appended to the latter.
///
/// ```no_run
/// # async fn demo() -> Result<(), next_session::SessionError> {
/// use http::HeaderMap;
/// use next_session::SessionManager;
///
/// let manager = SessionManager::from_env().await?;
/// let request = HeaderMap::new();
/// let mut response = HeaderMap::new();
///
/// manager
///     .set_session_data(&request, &mut response, &serde_json::json!({"user": "alice"}))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SessionManager {
    pub(super) store: Arc<dyn SessionStore>,
    pub(super) cookie: CookieHandler,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, cookie: CookieHandler) -> Self {
        Self { store, cookie }
    }

    /// Build the store backend and cookie handler described by `config`.
    pub async fn from_config(config: &SessionConfig) -> Result<Self, SessionError> {
        let store = create_session_store(config).await?;
        tracing::info!(
            cookie_name = %config.cookie.name,
            "Session manager initialized"
        );
        Ok(Self::new(store, CookieHandler::new(config.cookie.clone())))
    }

    /// Same as [`SessionManager::from_config`] with [`SessionConfig::from_env`].
    pub async fn from_env() -> Result<Self, SessionError> {
        Self::from_config(&SessionConfig::from_env()?).await
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn cookie_handler(&self) -> &CookieHandler {
        &self.cookie
    }

    /// Stop background work owned by the store.
    pub async fn shutdown(&self) {
        self.store.shutdown().await;
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("cookie", &self.cookie)
            .finish_non_exhaustive()
    }
}
