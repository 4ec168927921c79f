//! Observable client state.
//!
//! The view layer renders snapshots of this state; the orchestrator mutates
//! it as operations complete. There is no ambient singleton — the state lives
//! inside [`crate::App`] and is read through its getters.

use store::{Code, User};

/// Busy-indication flag set around every in-flight operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Loading {
    pub active: bool,
    /// Operation-specific label, e.g. `"Signing in..."`.
    pub label: String,
}

/// Everything the view layer can observe.
#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    /// The signed-in user, if any.
    pub user: Option<User>,
    /// The user's code list as last fetched or mutated.
    pub codes: Vec<Code>,
    pub loading: Loading,
    /// Last known reachability of the remote store.
    pub server_connected: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            user: None,
            codes: Vec::new(),
            loading: Loading::default(),
            // Optimistic until the first probe says otherwise.
            server_connected: true,
        }
    }
}
