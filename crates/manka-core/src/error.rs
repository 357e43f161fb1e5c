//! Error taxonomy shared by every transport.

use thiserror::Error;

use crate::envelope::{DEFAULT_ERROR_MESSAGE, UNAUTHORIZED_CODE};

/// Boxed error raised by an underlying network primitive.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application-level failure reported by the backend envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (code {code})")]
pub struct AppError {
    /// Envelope status code.
    pub code: i64,
    /// Human-readable message, never empty.
    pub message: String,
}

impl AppError {
    /// Create an application error, substituting the default message for an empty one.
    #[must_use]
    pub fn new(message: impl Into<String>, code: i64) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            DEFAULT_ERROR_MESSAGE.to_string()
        } else {
            message
        };
        Self { code, message }
    }
}

/// Error returned by every transport operation.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The HTTP status was not 200, so the envelope was never parsed.
    #[error("network is abnormal status: {status} text: {status_text}")]
    Network { status: u16, status_text: String },
    /// Connection, DNS or timeout failure from the underlying primitive.
    #[error(transparent)]
    Transport(BoxError),
    /// The body was not a valid envelope, or `data` did not match the expected type.
    #[error("malformed response body: {0}")]
    Decode(#[source] serde_json::Error),
    /// The request body could not be serialised.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    /// The backend reported an expired or missing session.
    #[error("authentication required: {}", .0.message)]
    Unauthorized(AppError),
    /// The backend reported an application failure.
    #[error("{}", .0.message)]
    App(AppError),
    /// The shared transport handle was used before being installed.
    #[error("http client has not been initialized")]
    NotInitialized,
}

impl HttpError {
    /// Wrap a failure from the underlying network primitive.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    /// Envelope code, present only for envelope-derived failures.
    #[must_use]
    pub const fn code(&self) -> Option<i64> {
        match self {
            Self::Unauthorized(e) | Self::App(e) => Some(e.code),
            _ => None,
        }
    }

    /// Envelope message, present only for envelope-derived failures.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(e) | Self::App(e) => Some(e.message.as_str()),
            _ => None,
        }
    }

    /// Whether the failure happened below the envelope layer.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Transport(_) | Self::Decode(_)
        )
    }

    /// Whether the backend reported an authentication failure.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(e) if e.code == UNAUTHORIZED_CODE)
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        if err.code == UNAUTHORIZED_CODE {
            Self::Unauthorized(err)
        } else {
            Self::App(err)
        }
    }
}

/// Key/value persistence error.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Internal(String),
}
