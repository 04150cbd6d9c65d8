use http::StatusCode;
use next_session::SessionError;

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

/// Caller mistakes become 400; anything from the store or the runtime is a 500
/// whose details stay in the log.
impl<T> IntoResponseError<T> for Result<T, SessionError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            if e.is_input_error() {
                (StatusCode::BAD_REQUEST, e.to_string())
            } else {
                tracing::error!("Session operation failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        })
    }
}
