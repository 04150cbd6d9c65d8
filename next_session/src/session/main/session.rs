use http::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::session::errors::SessionError;
use crate::session::types::SessionId;
use crate::storage::{SessionData, is_valid_session_id};

use super::manager::SessionManager;

impl SessionManager {
    /// Current session data, or an empty map when there is no live session.
    ///
    /// Never establishes a session; see [`SessionManager::get_session_id`].
    pub async fn get_session_data(
        &self,
        request: &HeaderMap,
        response: &mut HeaderMap,
    ) -> Result<SessionData, SessionError> {
        let session_id = self.get_session_id(request, response, false).await?;
        Ok(self
            .store
            .get(session_id.as_str())
            .await?
            .unwrap_or_default())
    }

    /// Deserialize a single value from the session data.
    ///
    /// Returns `None` when the key is absent. A present value of the wrong shape
    /// is an input error.
    pub async fn get_session_value<T: DeserializeOwned>(
        &self,
        request: &HeaderMap,
        response: &mut HeaderMap,
        key: &str,
    ) -> Result<Option<T>, SessionError> {
        let mut data = self.get_session_data(request, response).await?;
        data.remove(key)
            .map(|value| {
                serde_json::from_value(value).map_err(|e| {
                    SessionError::InvalidInput(format!("session value '{key}': {e}"))
                })
            })
            .transpose()
    }

    /// Overwrite the whole session data, establishing the session if needed.
    ///
    /// `data` must serialize to a JSON object.
    pub async fn replace_session_data<T: Serialize + ?Sized>(
        &self,
        request: &HeaderMap,
        response: &mut HeaderMap,
        data: &T,
    ) -> Result<(), SessionError> {
        let data = to_session_data(data)?;
        let session_id = self.get_session_id(request, response, true).await?;
        self.store.set(session_id.as_str(), data).await?;
        Ok(())
    }

    /// Merge the keys of `data` into the session data, establishing the session if needed.
    ///
    /// `data` must serialize to a JSON object.
    pub async fn set_session_data<T: Serialize + ?Sized>(
        &self,
        request: &HeaderMap,
        response: &mut HeaderMap,
        data: &T,
    ) -> Result<(), SessionError> {
        let data = to_session_data(data)?;
        let session_id = self.get_session_id(request, response, true).await?;
        self.store.merge(session_id.as_str(), data).await?;
        Ok(())
    }

    /// Remove `property` from the session data and return its value.
    ///
    /// Returns `None`, without writing anything, when the property is absent.
    /// Concurrent plucks of one property hand its value to exactly one caller.
    pub async fn pluck_session_property(
        &self,
        request: &HeaderMap,
        response: &mut HeaderMap,
        property: &str,
    ) -> Result<Option<Value>, SessionError> {
        if property.is_empty() {
            return Err(SessionError::InvalidInput(
                "property name is required".to_string(),
            ));
        }

        let session_id = self.get_session_id(request, response, false).await?;
        Ok(self.store.take(session_id.as_str(), property).await?)
    }

    /// Delete the session record and clear the cookie.
    ///
    /// The cookie is cleared exactly once, even when there was no record to delete.
    pub async fn destroy_session(
        &self,
        request: &HeaderMap,
        response: &mut HeaderMap,
    ) -> Result<(), SessionError> {
        // No resolver here: it would clear a stale cookie on its own
        let session_id = match self.cookie.read(request) {
            Some(id) if is_valid_session_id(id) => SessionId::new(id.to_string()),
            _ => SessionId::new(self.store.id()?),
        };

        self.store.destroy(session_id.as_str()).await?;
        self.cookie.destroy(response)?;
        tracing::debug!("Destroyed session {:?}", session_id);
        Ok(())
    }
}

/// Convert a caller-supplied payload into session data.
///
/// `null` stands for "no data given"; anything but an object is rejected too.
pub(crate) fn to_session_data<T: Serialize + ?Sized>(data: &T) -> Result<SessionData, SessionError> {
    let value = serde_json::to_value(data)
        .map_err(|e| SessionError::InvalidInput(format!("session data is not serializable: {e}")))?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Err(SessionError::InvalidInput(
            "session data is required".to_string(),
        )),
        _ => Err(SessionError::InvalidInput(
            "session data must be a JSON object".to_string(),
        )),
    }
}
