use thiserror::Error;

use crate::storage::StorageError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// The caller passed an unusable argument (missing data, empty property name).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error from the session store backend, passed through unchanged
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl SessionError {
    /// True for errors caused by the caller's arguments rather than by the system.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::Storage(StorageError::InvalidInput(_))
        )
    }
}
