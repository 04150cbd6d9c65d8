use http::HeaderMap;

use crate::session::errors::SessionError;
use crate::session::types::SessionId;
use crate::storage::{SessionData, is_valid_session_id};
use crate::utils::redact;

use super::manager::SessionManager;

/// What the request's session cookie turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CookieState {
    NoCookie,
    ValidSession,
    StaleSession,
}

impl SessionManager {
    /// Resolve the session id for the current request.
    ///
    /// A cookie naming a live store record is reused as is. Otherwise a fresh id
    /// is minted, and what happens next depends on `persist`:
    ///
    /// * `true`: an empty record is stored under the new id and a cookie carrying
    ///   it is appended to `response`.
    /// * `false`: nothing is stored. The id is only meaningful for the rest of
    ///   this request. A cookie that pointed at a missing record is cleared.
    ///
    /// Read-only callers therefore never make a session materialize client-side.
    pub async fn get_session_id(
        &self,
        request: &HeaderMap,
        response: &mut HeaderMap,
        persist: bool,
    ) -> Result<SessionId, SessionError> {
        let candidate = self.cookie.read(request);

        let state = match candidate {
            None => CookieState::NoCookie,
            Some(id) if !is_valid_session_id(id) => {
                tracing::warn!("Session cookie carries a malformed id, treating it as stale");
                CookieState::StaleSession
            }
            Some(id) => match self.store.get(id).await? {
                Some(_) => CookieState::ValidSession,
                None => CookieState::StaleSession,
            },
        };

        if let (CookieState::ValidSession, Some(id)) = (state, candidate) {
            tracing::trace!("Reusing session {}", redact(id));
            return Ok(SessionId::new(id.to_string()));
        }

        let new_id = self.store.id()?;

        if persist {
            self.store.set(&new_id, SessionData::new()).await?;
            self.cookie.write(response, &new_id)?;
            tracing::debug!(
                previous = ?state,
                "Established new session {}",
                redact(&new_id)
            );
        } else if state == CookieState::StaleSession {
            self.cookie.destroy(response)?;
            tracing::debug!("Cleared stale session cookie");
        }

        Ok(SessionId::new(new_id))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::*;
    use crate::storage::SessionStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_no_cookie_without_persist_is_ephemeral() {
        // Given a request without any cookie
        let (manager, store) = counting_manager();
        let request = http::HeaderMap::new();
        let mut response = http::HeaderMap::new();

        // When resolving read-only
        let id = manager
            .get_session_id(&request, &mut response, false)
            .await
            .unwrap();

        // Then an id is returned but nothing is written anywhere
        assert!(!id.as_str().is_empty());
        assert!(set_cookie_headers(&response).is_empty());
        assert_eq!(store.writes(), 0);
        assert!(store.inner.get(id.as_str()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_cookie_with_persist_establishes_session() {
        let (manager, store) = counting_manager();
        let request = http::HeaderMap::new();
        let mut response = http::HeaderMap::new();

        let id = manager
            .get_session_id(&request, &mut response, true)
            .await
            .unwrap();

        // One empty record and one cookie carrying the new id
        assert_eq!(store.sets(), 1);
        assert_eq!(
            store.inner.get(id.as_str()).await.unwrap(),
            Some(Default::default())
        );
        assert_eq!(set_cookie_headers(&response).len(), 1);
        assert_eq!(
            session_cookie_value(&response).as_deref(),
            Some(id.as_str())
        );
    }

    #[tokio::test]
    async fn test_valid_cookie_is_reused_without_writes() {
        // Given an existing session
        let (manager, store) = counting_manager();
        store
            .inner
            .set("existing-session", json_map(json!({"a": 1})))
            .await
            .unwrap();
        let request = request_with_session("existing-session");

        for persist in [false, true] {
            let mut response = http::HeaderMap::new();

            let id = manager
                .get_session_id(&request, &mut response, persist)
                .await
                .unwrap();

            // Then the same id comes back and neither cookie nor store is written
            assert_eq!(id.as_str(), "existing-session");
            assert!(set_cookie_headers(&response).is_empty());
        }
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_stale_cookie_without_persist_is_cleared() {
        // Given a cookie naming a session the store does not have
        let (manager, store) = counting_manager();
        let request = request_with_session("gone-session");
        let mut response = http::HeaderMap::new();

        let id = manager
            .get_session_id(&request, &mut response, false)
            .await
            .unwrap();

        // Then a different id is returned and the cookie is cleared, not replaced
        assert_ne!(id.as_str(), "gone-session");
        let cookies = set_cookie_headers(&response);
        assert_eq!(cookies.len(), 1);
        assert!(is_clearing_cookie(&cookies[0]));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_stale_cookie_with_persist_is_superseded() {
        let (manager, store) = counting_manager();
        let request = request_with_session("gone-session");
        let mut response = http::HeaderMap::new();

        let id = manager
            .get_session_id(&request, &mut response, true)
            .await
            .unwrap();

        assert_ne!(id.as_str(), "gone-session");
        let cookies = set_cookie_headers(&response);
        assert_eq!(cookies.len(), 1);
        assert!(!is_clearing_cookie(&cookies[0]));
        assert_eq!(
            session_cookie_value(&response).as_deref(),
            Some(id.as_str())
        );
        assert_eq!(store.sets(), 1);
    }

    #[tokio::test]
    async fn test_malformed_cookie_is_treated_as_stale() {
        let (manager, store) = counting_manager();
        let request = request_with_cookie_header("nextSession=bad\\id");
        let mut response = http::HeaderMap::new();

        let id = manager
            .get_session_id(&request, &mut response, false)
            .await
            .unwrap();

        assert_ne!(id.as_str(), "bad\\id");
        assert!(is_clearing_cookie(&set_cookie_headers(&response)[0]));
        // The store was never asked about the malformed id
        assert_eq!(store.gets(), 0);
    }

    #[tokio::test]
    async fn test_ephemeral_ids_differ_between_requests() {
        let (manager, _store) = counting_manager();
        let request = http::HeaderMap::new();

        let a = manager
            .get_session_id(&request, &mut http::HeaderMap::new(), false)
            .await
            .unwrap();
        let b = manager
            .get_session_id(&request, &mut http::HeaderMap::new(), false)
            .await
            .unwrap();

        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let manager = failing_manager();
        let request = request_with_session("some-session");
        let mut response = http::HeaderMap::new();

        let result = manager.get_session_id(&request, &mut response, false).await;

        assert!(matches!(
            result,
            Err(crate::SessionError::Storage(
                crate::StorageError::Storage(_)
            ))
        ));
        assert!(set_cookie_headers(&response).is_empty());
    }
}
