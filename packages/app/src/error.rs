//! User-facing failure taxonomy for orchestrator operations.

use api::RemoteError;
use thiserror::Error;

/// Why an operation failed, with a message fit for the notification channel.
///
/// Errors never propagate past an operation's public boundary: the
/// orchestrator surfaces the message as an error toast and returns the value
/// to the caller. The `Display` strings are exactly what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The connectivity probe failed or the connection was refused.
    #[error("Cannot connect to the remote store. Please check your internet connection.")]
    Connectivity,
    /// The remote answered with a non-success HTTP status.
    #[error("Server error: {status}")]
    Server { status: u16 },
    /// The request was fine but the data wasn't (bad credentials, duplicate
    /// email, no active session, unknown code id).
    #[error("{0}")]
    Validation(String),
    /// Generic transport failure with no response.
    #[error("Network error. Please check your connection.")]
    Network,
}

/// The single translation step between transport failures and user-facing
/// categories. Connection refusals and generic network failures collapse into
/// two fixed messages; server statuses keep their code.
impl From<RemoteError> for ActionError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::ConnectionRefused => ActionError::Connectivity,
            RemoteError::Status { status } => ActionError::Server { status },
            RemoteError::Decode(_) | RemoteError::Network(_) => ActionError::Network,
        }
    }
}
