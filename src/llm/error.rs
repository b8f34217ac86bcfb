//! Generation backend errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that can occur while talking to a generation backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendError {
    /// API request failed with the given message
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// Authentication failed or credentials are invalid
    AuthenticationError { message: String },

    /// Request timed out after the specified duration (in seconds)
    TimeoutError { seconds: u64 },

    /// Backend could not be reached
    NetworkError { message: String },

    /// Local backend process exited unsuccessfully
    ProcessFailed {
        program: String,
        exit_detail: String,
    },

    /// Backend answered with nothing but whitespace
    EmptyResponse,

    /// Configuration error (missing API keys, invalid settings, etc.)
    ConfigurationError { message: String },

    /// Generic error for other cases
    Other { message: String },
}

impl BackendError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            BackendError::AuthenticationError { .. } | BackendError::ConfigurationError { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BackendError::TimeoutError { .. })
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::ApiError {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "API error ({}): {}", code, message)
                } else {
                    write!(f, "API error: {}", message)
                }
            }
            BackendError::AuthenticationError { message } => {
                write!(f, "Authentication failed: {}", message)
            }
            BackendError::TimeoutError { seconds } => {
                write!(f, "Request timed out after {} seconds", seconds)
            }
            BackendError::NetworkError { message } => {
                write!(f, "Network error: {}", message)
            }
            BackendError::ProcessFailed {
                program,
                exit_detail,
            } => {
                write!(f, "'{}' failed: {}", program, exit_detail)
            }
            BackendError::EmptyResponse => write!(f, "Backend returned an empty response"),
            BackendError::ConfigurationError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            BackendError::Other { message } => {
                write!(f, "Error: {}", message)
            }
        }
    }
}

impl std::error::Error for BackendError {}
