//! Error types for the job server client

use std::error::Error as _;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while fetching a job status
#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not open a connection to the job server
    #[error("connection to {host} failed: {reason}")]
    ConnectionFailure {
        /// Host the connection was attempted to
        host: String,
        /// Underlying transport error
        reason: String,
    },

    /// The job server did not answer in time
    #[error("no response within {0:?}")]
    ResponseTimeout(Duration),

    /// Any other HTTP transport failure
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

impl ClientError {
    /// Create a connection failure for a host
    pub fn connection_failure(host: impl Into<String>, reason: impl ToString) -> Self {
        Self::ConnectionFailure {
            host: host.into(),
            reason: reason.to_string(),
        }
    }

    /// Classify a reqwest error raised while talking to the job server
    ///
    /// Failures to connect, including connect timeouts, are connection
    /// failures. A read that timed out after connecting is a response
    /// timeout of `response_timeout`.
    pub(crate) fn from_transport(host: &str, err: reqwest::Error, response_timeout: Duration) -> Self {
        if err.is_connect() {
            Self::connection_failure(host, err)
        } else if is_timeout_error(&err) {
            Self::ResponseTimeout(response_timeout)
        } else {
            Self::RequestFailed(err)
        }
    }

    /// Check if this error happened before the request reached the server
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::ConnectionFailure { .. })
    }

    /// Check if this error is a response timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ResponseTimeout(_))
    }
}

/// Whether a reqwest error, or any error it wraps, is a timeout
fn is_timeout_error(err: &reqwest::Error) -> bool {
    if err.is_timeout() {
        return true;
    }

    let mut source = err.source();
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return true;
            }
        }
        source = e.source();
    }
    false
}
