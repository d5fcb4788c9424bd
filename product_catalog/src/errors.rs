//! Client error types.

use thiserror::Error;

/// Errors surfaced by every client operation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// A form field failed a client-side check; no request was sent
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An identifier or paging argument was unusable; no request was sent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Token absent, expired, malformed, or rejected by the server
    #[error("Session expired. Please login again.")]
    SessionExpired,

    /// The server answered with a non-success status
    #[error("Request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    /// The request could not be completed
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered successfully but the body was unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The token store backend failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Get a message suitable for showing to the person at the keyboard
    ///
    /// Server messages are passed through verbatim. Transport and storage
    /// details are collapsed into generic text.
    pub fn client_message(&self) -> String {
        match self {
            ClientError::Validation(msg) | ClientError::InvalidArgument(msg) => msg.clone(),
            ClientError::RequestFailed { message, .. } => message.clone(),
            ClientError::Network(_) => "Could not reach the server".to_string(),
            ClientError::InvalidResponse(_) => "The server sent an unexpected response".to_string(),
            ClientError::Storage(_) => "Could not access the local session store".to_string(),
            ClientError::SessionExpired => self.to_string(),
        }
    }

    /// Whether the caller should send the user back to the login view
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
