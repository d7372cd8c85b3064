//! Session error types.

use crate::client::ServiceError;
use thiserror::Error;

/// Errors from login/logout and credential persistence.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The login call itself failed (transport, HTTP error, or rejection).
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Reading or writing the persisted credential file failed.
    #[error("credential storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The persisted credential record could not be encoded.
    #[error("credential encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl SessionError {
    /// One-line message suitable for the login screen.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Service(e) => e.user_message(),
            SessionError::Storage(_) | SessionError::Encoding(_) => {
                "Could not persist session".to_string()
            }
        }
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
