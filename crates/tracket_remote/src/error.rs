//! Error types for remote operations.

use thiserror::Error;

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Service status codes reported by the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// The request was malformed.
    InvalidArgument,
    /// The deadline expired before the call completed.
    DeadlineExceeded,
    /// The addressed resource does not exist remotely.
    NotFound,
    /// The caller is not allowed to perform the operation.
    PermissionDenied,
    /// The service is out of quota or throttling.
    ResourceExhausted,
    /// The service hit an internal error.
    Internal,
    /// The service is currently unavailable.
    Unavailable,
    /// The caller is not authenticated.
    Unauthenticated,
}

/// Errors that can occur when talking to the remote service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request never completed: connection reset, DNS failure,
    /// broken pipe, and similar transport-level I/O trouble.
    #[error("transport I/O error: {0}")]
    Io(String),

    /// The service answered with a non-OK status.
    #[error("remote status {code:?}: {message}")]
    Status {
        /// Status code reported by the service.
        code: StatusCode,
        /// Human-readable detail.
        message: String,
    },
}

impl RemoteError {
    /// Creates a transport I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// Creates a status error.
    pub fn status(code: StatusCode, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }

    /// Returns the status code, if the service answered at all.
    pub fn code(&self) -> Option<StatusCode> {
        match self {
            RemoteError::Io(_) => None,
            RemoteError::Status { code, .. } => Some(*code),
        }
    }
}
