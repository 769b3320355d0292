//! Error types for port operations.

/// Storage operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Database operation failed - includes operation name for tracing.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    /// Create a Database error with operation context.
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }
}

/// Failures talking to the external player profile store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProfileStoreError {
    #[error("Profile store request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid profile store response: {0}")]
    InvalidResponse(String),
}

/// Session token rejections. Messages are sent to the client as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingToken,
    #[error("Invalid token")]
    Malformed,
    #[error("Invalid token")]
    BadSignature,
    #[error("Token expired")]
    Expired,
    #[error("Invalid token")]
    ReservedIdentity,
    #[error("User ID does not match token")]
    IdentityMismatch,
}
