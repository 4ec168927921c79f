//! # API crate — remote-store access for the dovecode client
//!
//! Everything the orchestration core needs to reach the backing
//! resource-collection service lives here.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`remote`] | The [`RemoteStore`] trait: the async interface every backend implements |
//! | [`http`] | [`HttpRemote`], the production implementation over `reqwest` |
//! | [`memory`] | [`MemoryRemote`], an in-memory backend for tests and offline development |
//! | [`error`] | [`RemoteError`], the transport-level failure classification |

pub mod error;
pub mod http;
pub mod remote;

mod memory;
pub use memory::MemoryRemote;

pub use error::RemoteError;
pub use http::HttpRemote;
pub use remote::RemoteStore;
