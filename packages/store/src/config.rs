//! # Application configuration — `dovecode.toml`
//!
//! Defines the TOML configuration read once at startup by whichever shell
//! embeds the client core. The file selects the remote backend and where the
//! session cache lives.
//!
//! ## Structure
//!
//! ```toml
//! [remote]
//! base_url = "http://localhost:3001"
//! mode = "embedded"        # or "standalone"
//!
//! [cache]
//! dir = "/tmp/dovecode"    # optional; platform data dir when absent
//! ```
//!
//! All structs derive `Default` so a missing or empty config file is
//! equivalent to the default configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How the backend stores code records. The two layouts are not
/// interchangeable; the mode is picked once at startup and the orchestrator
/// branches on it explicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeStorageMode {
    /// Codes live inside the user record's `codes` array; the users
    /// collection is exposed under the legacy `books` path.
    #[default]
    Embedded,
    /// Proper `users`/`codes`/`sessions` collections.
    Standalone,
}

/// Top-level configuration stored in `dovecode.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Remote-store selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub mode: CodeStorageMode,
}

fn default_base_url() -> String {
    "http://localhost:3001".to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            mode: CodeStorageMode::default(),
        }
    }
}

/// Session-cache location.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding the session file. `None` means the platform data
    /// directory (see [`crate::SessionCache::default_dir`]).
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "dovecode.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
