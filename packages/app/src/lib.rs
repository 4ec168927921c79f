//! # App crate — orchestration core of the dovecode client
//!
//! The view layer talks to exactly one type from this crate: [`App`]. It
//! owns the observable state (current user, code list, loading and
//! connectivity flags), the toast channel, and the persisted session cache,
//! and runs every user-facing operation against a [`api::RemoteStore`]
//! backend.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`app`] | [`App`], the request orchestrator |
//! | [`state`] | [`AppState`], the observable snapshot |
//! | [`toast`] | [`Toasts`], the single-slot notification channel |
//! | [`routes`] | [`Route`] and the auth gate |
//! | [`error`] | [`ActionError`], the user-facing failure taxonomy |

pub mod app;
pub mod error;
pub mod routes;
pub mod state;
pub mod toast;

pub use app::{App, ProfileUpdate};
pub use error::ActionError;
pub use routes::{Access, Route};
pub use state::{AppState, Loading};
pub use toast::{Toast, ToastKind, Toasts};

use store::{AppConfig, SessionCache};

/// Build the production [`App`] from configuration: an HTTP remote against
/// the configured base URL and a session cache in the configured directory
/// (platform data directory when unset).
pub fn make_app(config: &AppConfig) -> App<api::HttpRemote> {
    let remote = api::HttpRemote::new(&config.remote.base_url, config.remote.mode);
    let cache = match &config.cache.dir {
        Some(dir) => SessionCache::new(dir.clone()),
        None => SessionCache::in_default_dir(),
    };
    App::new(remote, cache, config.remote.mode)
}
