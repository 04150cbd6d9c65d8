use crate::storage::errors::StorageError;

/// Application payload of a session: string keys to arbitrary JSON values.
pub type SessionData = serde_json::Map<String, serde_json::Value>;

pub(crate) const MAX_SESSION_ID_LEN: usize = 256;

/// Whether `id` can be used as a store key and carried in a cookie verbatim.
pub(crate) fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_graphic() && !matches!(b, b';' | b',' | b'"' | b'\\'))
}

pub(crate) fn validate_session_id(id: &str) -> Result<(), StorageError> {
    if id.is_empty() {
        return Err(StorageError::InvalidInput(
            "session id is required".to_string(),
        ));
    }
    if !is_valid_session_id(id) {
        return Err(StorageError::InvalidInput(format!(
            "malformed session id ({} bytes)",
            id.len()
        )));
    }
    Ok(())
}
