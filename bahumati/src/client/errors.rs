//! Service error taxonomy.

use thiserror::Error;

/// Errors surfaced by backend calls.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport failure: the backend was never reached or the connection
    /// broke mid-request.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx HTTP response; `message` is taken from the JSON error body
    /// when the backend provides one.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// 2xx response whose body carried `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// The response body did not match the documented wire shape.
    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

impl ServiceError {
    /// One-line message suitable for a toast. Transport and shape errors
    /// are collapsed so raw reqwest/serde internals never reach the screen.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Transport(_) => "Network error, backend unreachable".to_string(),
            ServiceError::Malformed(_) => "Backend returned an unexpected response".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for backend operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_backend_message() {
        let err = ServiceError::Api {
            status: 403,
            message: "Agent is disabled".to_string(),
        };
        assert_eq!(err.to_string(), "Agent is disabled");
        assert_eq!(err.user_message(), "Agent is disabled");
    }

    #[test]
    fn malformed_is_sanitized_for_users() {
        let err = ServiceError::Malformed("missing field `users`".to_string());
        assert!(err.to_string().contains("missing field"));
        assert!(!err.user_message().contains("missing field"));
    }
}
