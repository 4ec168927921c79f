//! # RemoteStore — abstract access to the resource-collection backend
//!
//! The remote store is a plain HTTP service exposing JSON resource
//! collections (users, codes, sessions). All orchestrator reads and writes go
//! through the [`RemoteStore`] trait, so the same orchestration logic works
//! against the live HTTP backend ([`crate::HttpRemote`]) or the in-memory
//! store used by tests and offline development ([`crate::MemoryRemote`]).
//!
//! ## Methods
//!
//! | Method | Used by | Notes |
//! |--------|---------|-------|
//! | `probe` | every operation | Minimal read of the users collection; `true` iff the response indicates success. Never errors. |
//! | `find_users_by_email` | login, signup pre-check | Filter via query parameter; results are re-filtered client-side because mock backends match fuzzily. |
//! | `get_user` | startup session re-validation, embedded code listing | |
//! | `create_user` / `update_user` | signup / login, profile, embedded code writes | `update_user` is a full PUT of the record. |
//! | `list_codes` / `create_code` / `update_code` / `delete_code` | code CRUD | Standalone mode only; embedded mode rewrites the owning user instead. |
//! | `create_session` / `delete_sessions` | standalone signup / logout | Sessions exist only in standalone mode. |

use store::{Code, Session, User};

use crate::error::RemoteError;

/// Async interface to the remote resource-collection store.
pub trait RemoteStore {
    /// Connectivity probe: issue a minimal read and report reachability.
    /// Network failures fold into `false`; this never errors.
    fn probe(&self) -> impl std::future::Future<Output = bool>;

    /// Users whose email exactly matches `email`.
    fn find_users_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Vec<User>, RemoteError>>;

    fn get_user(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<User, RemoteError>>;

    /// Create a user record; the returned record carries the assigned id.
    fn create_user(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RemoteError>>;

    /// Full update of an existing user record, keyed by `user.id`.
    fn update_user(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RemoteError>>;

    /// Codes owned by `user_id` (standalone mode).
    fn list_codes(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Code>, RemoteError>>;

    /// Create a code record; the returned record carries the assigned id.
    fn create_code(
        &self,
        code: &Code,
    ) -> impl std::future::Future<Output = Result<Code, RemoteError>>;

    /// Full update of an existing code record, keyed by `code.id`.
    fn update_code(
        &self,
        code: &Code,
    ) -> impl std::future::Future<Output = Result<Code, RemoteError>>;

    fn delete_code(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>>;

    /// Record a login event (standalone mode).
    fn create_session(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<Session, RemoteError>>;

    /// Delete every session belonging to `user_id`; returns how many were
    /// removed.
    fn delete_sessions(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<usize, RemoteError>>;
}
