//! In-memory RemoteStore for tests and offline development.
//!
//! Behaves like a tiny resource-collection backend: ids are assigned on
//! create, missing records answer with status 404. Two switches make failure
//! paths testable — [`MemoryRemote::set_online`] makes the probe fail and
//! every call answer like a refused connection, and
//! [`MemoryRemote::fail_with_status`] makes every call answer with a fixed
//! HTTP status. [`MemoryRemote::primary_calls`] counts every non-probe call
//! so tests can assert that a failed probe short-circuits an operation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use store::{Code, Session, User};
use uuid::Uuid;

use crate::error::RemoteError;
use crate::remote::RemoteStore;

#[derive(Debug)]
struct Inner {
    users: HashMap<String, User>,
    codes: HashMap<String, Code>,
    sessions: HashMap<String, Session>,
    online: bool,
    fail_status: Option<u16>,
    primary_calls: u64,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            codes: HashMap::new(),
            sessions: HashMap::new(),
            online: true,
            fail_status: None,
            primary_calls: 0,
        }
    }
}

/// Remote store held entirely in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryRemote {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle reachability: while offline the probe reports `false` and every
    /// call fails like a refused connection.
    pub fn set_online(&self, online: bool) {
        self.inner.lock().unwrap().online = online;
    }

    /// Make every call answer with the given HTTP status (`None` restores
    /// normal behavior).
    pub fn fail_with_status(&self, status: Option<u16>) {
        self.inner.lock().unwrap().fail_status = status;
    }

    /// Number of non-probe calls issued so far.
    pub fn primary_calls(&self) -> u64 {
        self.inner.lock().unwrap().primary_calls
    }

    /// Insert a user directly, assigning an id. Returns the stored record.
    pub fn seed_user(&self, mut user: User) -> User {
        let mut inner = self.inner.lock().unwrap();
        if user.id.is_empty() {
            user.id = Uuid::new_v4().to_string();
        }
        inner.users.insert(user.id.clone(), user.clone());
        user
    }

    /// Sessions currently held for the given user.
    pub fn sessions_for(&self, user_id: &str) -> Vec<Session> {
        let inner = self.inner.lock().unwrap();
        inner
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    /// The stored user record, if any.
    pub fn stored_user(&self, id: &str) -> Option<User> {
        self.inner.lock().unwrap().users.get(id).cloned()
    }

    fn begin_call(&self) -> Result<std::sync::MutexGuard<'_, Inner>, RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        inner.primary_calls += 1;
        if !inner.online {
            return Err(RemoteError::ConnectionRefused);
        }
        if let Some(status) = inner.fail_status {
            return Err(RemoteError::Status { status });
        }
        Ok(inner)
    }
}

impl RemoteStore for MemoryRemote {
    async fn probe(&self) -> bool {
        self.inner.lock().unwrap().online
    }

    async fn find_users_by_email(&self, email: &str) -> Result<Vec<User>, RemoteError> {
        let inner = self.begin_call()?;
        Ok(inner
            .users
            .values()
            .filter(|u| u.email == email)
            .cloned()
            .collect())
    }

    async fn get_user(&self, id: &str) -> Result<User, RemoteError> {
        let inner = self.begin_call()?;
        inner
            .users
            .get(id)
            .cloned()
            .ok_or(RemoteError::Status { status: 404 })
    }

    async fn create_user(&self, user: &User) -> Result<User, RemoteError> {
        let mut inner = self.begin_call()?;
        let mut stored = user.clone();
        stored.id = Uuid::new_v4().to_string();
        inner.users.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update_user(&self, user: &User) -> Result<User, RemoteError> {
        let mut inner = self.begin_call()?;
        if !inner.users.contains_key(&user.id) {
            return Err(RemoteError::Status { status: 404 });
        }
        inner.users.insert(user.id.clone(), user.clone());
        Ok(user.clone())
    }

    async fn list_codes(&self, user_id: &str) -> Result<Vec<Code>, RemoteError> {
        let inner = self.begin_call()?;
        Ok(inner
            .codes
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_code(&self, code: &Code) -> Result<Code, RemoteError> {
        let mut inner = self.begin_call()?;
        let mut stored = code.clone();
        if stored.id.is_empty() {
            stored.id = Uuid::new_v4().to_string();
        }
        inner.codes.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update_code(&self, code: &Code) -> Result<Code, RemoteError> {
        let mut inner = self.begin_call()?;
        if !inner.codes.contains_key(&code.id) {
            return Err(RemoteError::Status { status: 404 });
        }
        inner.codes.insert(code.id.clone(), code.clone());
        Ok(code.clone())
    }

    async fn delete_code(&self, id: &str) -> Result<(), RemoteError> {
        let mut inner = self.begin_call()?;
        if inner.codes.remove(id).is_none() {
            return Err(RemoteError::Status { status: 404 });
        }
        Ok(())
    }

    async fn create_session(&self, session: &Session) -> Result<Session, RemoteError> {
        let mut inner = self.begin_call()?;
        let mut stored = session.clone();
        stored.id = Uuid::new_v4().to_string();
        inner.sessions.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn delete_sessions(&self, user_id: &str) -> Result<usize, RemoteError> {
        let mut inner = self.begin_call()?;
        let ids: Vec<String> = inner
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.id.clone())
            .collect();
        for id in &ids {
            inner.sessions.remove(id);
        }
        Ok(ids.len())
    }
}
