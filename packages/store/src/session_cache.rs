//! # Persisted session cache
//!
//! [`SessionCache`] keeps the last signed-in [`User`] in a single JSON file
//! under a fixed name, so a restart can restore the session without asking
//! for credentials again. The entry is advisory: the orchestrator
//! re-validates it against the remote store at startup and discards it if the
//! remote lookup fails.
//!
//! ## Layout
//!
//! ```text
//! <dir>/
//! └── dove_user.json         # JSON-serialized User record
//! ```
//!
//! ## Platform data directories
//!
//! [`SessionCache::default_dir`] uses [`dirs::data_dir()`]:
//!
//! | Platform | Path |
//! |----------|------|
//! | macOS | `~/Library/Application Support/dovecode/` |
//! | Linux | `~/.local/share/dovecode/` |
//! | Windows | `C:\Users\<user>\AppData\Roaming\dovecode\` |

use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::User;

/// Failure reading or writing the session file.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("session cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session cache serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// File-backed store for the last-known signed-in user.
#[derive(Clone, Debug)]
pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    /// Cache rooted at the given directory.
    pub fn new(dir: PathBuf) -> Self {
        Self {
            path: dir.join(Self::filename()),
        }
    }

    /// Cache rooted at the platform data directory.
    pub fn in_default_dir() -> Self {
        Self::new(Self::default_dir())
    }

    /// The fixed name of the session file.
    pub fn filename() -> &'static str {
        "dove_user.json"
    }

    /// Platform-appropriate base directory.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dovecode")
    }

    /// Persist the user record, replacing any previous entry.
    pub fn save(&self, user: &User) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(user)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Load the cached user, or `None` when no entry exists.
    pub fn load(&self) -> Result<Option<User>, CacheError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Remove the entry. Removing a missing entry is not an error.
    pub fn clear(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
