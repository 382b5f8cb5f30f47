//! Error types for onekey.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for every provider call and pipeline step.
#[derive(Error, Debug)]
pub enum OneKeyError {
    /// A required credential (API key, base URL, deployment) is unset or blank.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The caller supplied a blank model or prompt.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request never produced a usable vendor payload (DNS, connect,
    /// timeout, body read, malformed JSON).
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The vendor answered with a non-success HTTP status.
    #[error("Protocol error (status {status}): {body}")]
    Protocol { status: u16, body: String },

    /// The vendor answered successfully but the payload was null or empty.
    #[error("{provider} returned an empty response")]
    EmptyResponse { provider: String },

    /// The clipboard could not be captured.
    #[error("Capture error: {0}")]
    Capture(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config store (de)serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<reqwest::Error> for OneKeyError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {err}")
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        Self::Transport {
            message,
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for OneKeyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Transport {
            message: format!("malformed response payload: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

impl OneKeyError {
    /// Create a transport error without an underlying source.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Create a protocol error from a status code and raw body.
    pub fn protocol(status: u16, body: impl Into<String>) -> Self {
        Self::Protocol {
            status,
            body: body.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Validation(_) | Self::InvalidArgument(_) => ErrorCategory::Validation,
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::Protocol { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                _ => ErrorCategory::Protocol,
            },
            Self::EmptyResponse { .. } => ErrorCategory::EmptyResponse,
            Self::Capture(_) => ErrorCategory::Capture,
            Self::Io(_) | Self::Serialization(_) => ErrorCategory::Storage,
        }
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::Validation => RecoverySuggestion::CheckInput,
            ErrorCategory::Transport => RecoverySuggestion::CheckNetwork,
            ErrorCategory::Protocol | ErrorCategory::EmptyResponse => {
                RecoverySuggestion::ContactProvider
            }
            ErrorCategory::Capture => RecoverySuggestion::SelectText,
            ErrorCategory::Storage => RecoverySuggestion::CheckConfigFile,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, OneKeyError>;
