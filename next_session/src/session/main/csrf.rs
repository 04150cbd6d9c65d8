use http::HeaderMap;
use serde_json::Value;
use subtle::ConstantTimeEq;

use crate::session::errors::SessionError;
use crate::storage::SessionData;
use crate::utils::{RANDOM_TOKEN_BYTES, gen_random_string};

use super::manager::SessionManager;

/// Session key under which the pending CSRF token is kept.
pub const CSRF_TOKEN_KEY: &str = "csrfToken";

impl SessionManager {
    /// Generate a CSRF token and store it in the session, establishing the session if needed.
    ///
    /// Issuing again replaces any token still pending.
    pub async fn issue_csrf_token(
        &self,
        request: &HeaderMap,
        response: &mut HeaderMap,
    ) -> Result<String, SessionError> {
        let token = gen_random_string(RANDOM_TOKEN_BYTES)?;

        let mut patch = SessionData::new();
        patch.insert(CSRF_TOKEN_KEY.to_string(), Value::String(token.clone()));
        self.set_session_data(request, response, &patch).await?;

        tracing::debug!("Issued CSRF token");
        Ok(token)
    }

    /// Check `token` against the one pending in the session.
    ///
    /// The pending token is consumed whatever the outcome, in a single store
    /// operation, so a token validates at most once even under concurrent requests.
    pub async fn validate_csrf_token(
        &self,
        request: &HeaderMap,
        response: &mut HeaderMap,
        token: &str,
    ) -> Result<bool, SessionError> {
        let session_id = self.get_session_id(request, response, true).await?;
        let stored = self.store.take(session_id.as_str(), CSRF_TOKEN_KEY).await?;

        let matches: bool = match stored.as_ref().and_then(Value::as_str) {
            Some(stored) if !token.is_empty() => {
                stored.as_bytes().ct_eq(token.as_bytes()).into()
            }
            _ => false,
        };

        if !matches {
            tracing::warn!(
                token_present = stored.is_some(),
                "CSRF token validation failed"
            );
        }
        Ok(matches)
    }
}
