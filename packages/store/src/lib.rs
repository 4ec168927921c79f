pub mod config;
pub mod models;
pub mod session_cache;

pub use config::{AppConfig, CacheConfig, CodeStorageMode, RemoteConfig};
pub use models::{Code, Session, User};
pub use session_cache::{CacheError, SessionCache};
