//! Transport-level error classification for remote-store calls.

use thiserror::Error;

/// Why a remote-store call failed.
///
/// Every failure a [`crate::RemoteStore`] method can produce collapses into
/// one of these four categories; the orchestrator translates them into its
/// user-facing taxonomy in a single step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The remote refused the TCP connection (server down or unreachable).
    #[error("connection refused")]
    ConnectionRefused,
    /// The remote answered with a non-success HTTP status.
    #[error("server returned status {status}")]
    Status { status: u16 },
    /// The response body was not the JSON we expected.
    #[error("invalid response body: {0}")]
    Decode(String),
    /// Any other transport failure (DNS, timeout, broken connection).
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            RemoteError::ConnectionRefused
        } else if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            RemoteError::Status {
                status: status.as_u16(),
            }
        } else {
            RemoteError::Network(e.to_string())
        }
    }
}
