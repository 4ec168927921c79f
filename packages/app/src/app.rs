//! # App — the request orchestrator
//!
//! [`App`] exposes one async operation per user-facing action and owns every
//! piece of client state those actions touch: the signed-in user, the code
//! list, the loading and connectivity flags, the toast channel, and the
//! persisted session cache. All remote access goes through the
//! [`RemoteStore`] trait, so the same orchestration runs against the HTTP
//! backend or the in-memory one used by tests.
//!
//! ## Operation shape
//!
//! Every operation follows the same sequence:
//!
//! 1. set the loading flag with an operation label,
//! 2. probe connectivity — a failed probe aborts before any primary call,
//! 3. issue the primary remote call(s),
//! 4. commit the result to in-memory state (and the session cache for
//!    auth-affecting actions),
//! 5. clear the loading flag and emit a toast.
//!
//! Failures are surfaced as an error toast and returned as
//! [`ActionError`]; they never propagate past the operation. `logout` is the
//! one exception: remote failures are swallowed, local state is cleared
//! unconditionally, and the operation always reports success.
//!
//! ## Operations
//!
//! | Operation | Remote calls | Local effects |
//! |-----------|--------------|---------------|
//! | [`login`](App::login) | find users by email, write back `lastLoginAt` | set user, persist cache |
//! | [`signup`](App::signup) | duplicate-email pre-check, create user (+ session in standalone mode) | none until login |
//! | [`update_profile`](App::update_profile) | full PUT of the user record | merge into user, persist cache |
//! | [`create_code`](App::create_code) | PUT user (embedded) / POST code (standalone) | append to code list |
//! | [`get_user_codes`](App::get_user_codes) | re-read user (embedded) / GET codes (standalone) | replace code list |
//! | [`update_code`](App::update_code) | PUT user (embedded) / PUT code (standalone) | replace matching entry |
//! | [`delete_code`](App::delete_code) | PUT user (embedded) / DELETE code (standalone) | remove matching entry |
//! | [`logout`](App::logout) | best-effort `lastLogoutAt` write / bulk session delete | clear user, codes, cache |
//! | [`init_auth`](App::init_auth) | probe, re-validate cached user | restore or discard the session |
//! | [`check_connection`](App::check_connection) | probe | update connectivity flag |
//!
//! Concurrent operations are last-write-wins: state commits happen under a
//! short mutex that is never held across an await.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use api::{RemoteError, RemoteStore};
use store::{Code, CodeStorageMode, Session, SessionCache, User};

use crate::error::ActionError;
use crate::routes::{self, Access, Route};
use crate::state::{AppState, Loading};
use crate::toast::Toasts;

const MSG_INVALID_CREDENTIALS: &str = "Invalid email or password";
const MSG_EMAIL_TAKEN: &str = "Email already registered";
const MSG_NO_SESSION: &str = "No user logged in";
const MSG_CODE_NOT_FOUND: &str = "Code not found";
const MSG_INIT_FAILED: &str =
    "Failed to initialize authentication. Please check your connection.";

/// Partial profile change. Unset fields keep their current value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    pub subscription: Option<String>,
    pub generations_left: Option<u32>,
}

/// The orchestration core. Owns all client state; the view layer reads
/// snapshots through the getters and invokes the async operations.
pub struct App<R: RemoteStore> {
    remote: R,
    cache: SessionCache,
    mode: CodeStorageMode,
    state: Arc<Mutex<AppState>>,
    toasts: Toasts,
}

impl<R: RemoteStore> App<R> {
    pub fn new(remote: R, cache: SessionCache, mode: CodeStorageMode) -> Self {
        Self {
            remote,
            cache,
            mode,
            state: Arc::new(Mutex::new(AppState::default())),
            toasts: Toasts::new(),
        }
    }

    // ---- observable state -------------------------------------------------

    /// Snapshot of the full observable state.
    pub fn state(&self) -> AppState {
        self.state.lock().unwrap().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.lock().unwrap().user.clone()
    }

    pub fn codes(&self) -> Vec<Code> {
        self.state.lock().unwrap().codes.clone()
    }

    pub fn loading(&self) -> Loading {
        self.state.lock().unwrap().loading.clone()
    }

    /// Last known reachability of the remote store.
    pub fn server_connected(&self) -> bool {
        self.state.lock().unwrap().server_connected
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn mode(&self) -> CodeStorageMode {
        self.mode
    }

    /// Auth gate: decide whether `to` is reachable right now.
    pub fn guard(&self, to: Route) -> Access {
        routes::guard(self.current_user().is_some(), to)
    }

    /// Local-only mutation: the view layer calls this after producing a QR
    /// image to reflect the remaining quota without a round-trip.
    pub fn set_generations_left(&self, count: u32) {
        let mut state = self.state.lock().unwrap();
        if let Some(user) = state.user.as_mut() {
            user.generations_left = count;
        }
    }

    // ---- operations -------------------------------------------------------

    /// Probe the remote store and update the connectivity flag. Emits an
    /// error toast when unreachable.
    pub async fn check_connection(&self) -> bool {
        let connected = self.remote.probe().await;
        self.state.lock().unwrap().server_connected = connected;
        if !connected {
            self.toasts.error(ActionError::Connectivity.to_string());
        }
        connected
    }

    /// Restore the session from the persisted cache, re-validating the
    /// cached record against the remote store. A record the remote no longer
    /// knows is discarded silently; a network failure discards it with an
    /// error toast. Offline startup keeps the cache for a later attempt.
    pub async fn init_auth(&self) -> Option<User> {
        if !self.check_connection().await {
            warn!("remote store unreachable, skipping session restore");
            return None;
        }

        let cached = match self.cache.load() {
            Ok(Some(user)) => user,
            Ok(None) => return None,
            Err(e) => {
                warn!("unreadable session cache, discarding: {e}");
                self.clear_cache();
                return None;
            }
        };

        match self.remote.get_user(&cached.id).await {
            Ok(current) => {
                self.state.lock().unwrap().user = Some(current.clone());
                self.persist(&current);
                Some(current)
            }
            Err(RemoteError::Status { .. }) => {
                // The account no longer exists remotely; drop the stale entry.
                self.clear_cache();
                None
            }
            Err(e) => {
                warn!("session re-validation failed: {e}");
                self.clear_cache();
                self.toasts.error(MSG_INIT_FAILED);
                None
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ActionError> {
        self.begin("Signing in...");
        let result = self.try_login(email, password).await;
        self.finish(result, "Welcome back!")
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<User, ActionError> {
        self.begin("Creating account...");
        let result = self.try_signup(email, password).await;
        self.finish(result, "Account created successfully!")
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<User, ActionError> {
        self.begin("Updating profile...");
        let result = self.try_update_profile(update).await;
        self.finish(result, "Profile updated successfully")
    }

    pub async fn create_code(&self, payload: Map<String, Value>) -> Result<Code, ActionError> {
        self.begin("Creating code...");
        let result = self.try_create_code(payload).await;
        self.finish(result, "Code created successfully")
    }

    pub async fn get_user_codes(&self) -> Result<Vec<Code>, ActionError> {
        self.begin("Loading codes...");
        let result = self.try_get_user_codes().await;
        self.finish(result, "Codes loaded")
    }

    pub async fn update_code(
        &self,
        id: &str,
        updates: Map<String, Value>,
    ) -> Result<Code, ActionError> {
        self.begin("Updating code...");
        let result = self.try_update_code(id, updates).await;
        self.finish(result, "Code updated successfully")
    }

    pub async fn delete_code(&self, id: &str) -> Result<(), ActionError> {
        self.begin("Deleting code...");
        let result = self.try_delete_code(id).await;
        self.finish(result, "Code deleted successfully")
    }

    /// Best-effort sign-out. Remote failures are swallowed; in-memory state
    /// and the persisted cache are cleared unconditionally, so the client
    /// always ends logged-out from its own perspective.
    pub async fn logout(&self) -> Result<(), ActionError> {
        self.begin("Signing out...");

        let remote_ok = match self.current_user() {
            Some(user) => self.try_remote_logout(&user).await,
            None => true,
        };

        {
            let mut state = self.state.lock().unwrap();
            state.user = None;
            state.codes.clear();
            state.loading = Loading::default();
        }
        self.clear_cache();

        self.toasts.success(if remote_ok {
            "Logged out successfully"
        } else {
            "Logged out locally"
        });
        Ok(())
    }

    // ---- action bodies ----------------------------------------------------

    async fn try_login(&self, email: &str, password: &str) -> Result<User, ActionError> {
        self.ensure_online().await?;

        let candidates = self.remote.find_users_by_email(email).await?;
        // Password mismatch and unknown email must be indistinguishable.
        let Some(user) = candidates.into_iter().find(|u| u.password == password) else {
            return Err(ActionError::Validation(MSG_INVALID_CREDENTIALS.into()));
        };

        let mut updated = user;
        updated.last_login_at = Some(Utc::now());
        let stored = self.remote.update_user(&updated).await?;

        self.state.lock().unwrap().user = Some(stored.clone());
        self.persist(&stored);
        Ok(stored)
    }

    async fn try_signup(&self, email: &str, password: &str) -> Result<User, ActionError> {
        self.ensure_online().await?;

        // Pre-check only: two concurrent signups with the same email can both
        // pass. Accepted weakness of the backend contract.
        let existing = self.remote.find_users_by_email(email).await?;
        if !existing.is_empty() {
            return Err(ActionError::Validation(MSG_EMAIL_TAKEN.into()));
        }

        let created = self
            .remote
            .create_user(&User::new_account(email, password))
            .await?;

        if self.mode == CodeStorageMode::Standalone {
            // Not atomic with the create above; a failure here is surfaced
            // but the user record is not rolled back.
            self.remote
                .create_session(&Session::new(created.id.as_str()))
                .await?;
        }

        // No local session until the user logs in.
        Ok(created)
    }

    async fn try_update_profile(&self, update: ProfileUpdate) -> Result<User, ActionError> {
        let mut user = self.require_user()?;
        self.ensure_online().await?;

        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(password) = update.password {
            user.password = password;
        }
        if let Some(subscription) = update.subscription {
            user.subscription = subscription;
        }
        if let Some(generations_left) = update.generations_left {
            user.generations_left = generations_left;
        }

        let stored = self.remote.update_user(&user).await?;
        self.state.lock().unwrap().user = Some(stored.clone());
        self.persist(&stored);
        Ok(stored)
    }

    async fn try_create_code(&self, payload: Map<String, Value>) -> Result<Code, ActionError> {
        let user = self.require_user()?;
        self.ensure_online().await?;

        match self.mode {
            CodeStorageMode::Embedded => {
                let mut code = Code::new(user.id.as_str(), payload);
                code.id = Uuid::new_v4().to_string();

                let mut updated = user;
                updated.codes.push(code.clone());
                let stored_user = self.remote.update_user(&updated).await?;

                let mut state = self.state.lock().unwrap();
                state.user = Some(stored_user);
                state.codes.push(code.clone());
                Ok(code)
            }
            CodeStorageMode::Standalone => {
                let code = Code::new(user.id.as_str(), payload);
                let stored = self.remote.create_code(&code).await?;
                self.state.lock().unwrap().codes.push(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn try_get_user_codes(&self) -> Result<Vec<Code>, ActionError> {
        let user = self.require_user()?;
        self.ensure_online().await?;

        let codes = match self.mode {
            CodeStorageMode::Embedded => {
                let refreshed = self.remote.get_user(&user.id).await?;
                let codes = refreshed.codes.clone();
                self.state.lock().unwrap().user = Some(refreshed);
                codes
            }
            CodeStorageMode::Standalone => self.remote.list_codes(&user.id).await?,
        };

        self.state.lock().unwrap().codes = codes.clone();
        Ok(codes)
    }

    async fn try_update_code(
        &self,
        id: &str,
        updates: Map<String, Value>,
    ) -> Result<Code, ActionError> {
        let user = self.require_user()?;
        self.ensure_online().await?;

        match self.mode {
            CodeStorageMode::Embedded => {
                let mut updated_user = user;
                let Some(idx) = updated_user.codes.iter().position(|c| c.id == id) else {
                    return Err(ActionError::Validation(MSG_CODE_NOT_FOUND.into()));
                };
                // Only the open payload is mutable; id, owner, and creation
                // time stay as they are, so their wire keys are dropped.
                for (key, value) in updates {
                    if Code::RESERVED_KEYS.contains(&key.as_str()) {
                        continue;
                    }
                    updated_user.codes[idx].payload.insert(key, value);
                }
                let updated_code = updated_user.codes[idx].clone();

                let stored_user = self.remote.update_user(&updated_user).await?;

                let mut state = self.state.lock().unwrap();
                state.user = Some(stored_user);
                if let Some(slot) = state.codes.iter_mut().find(|c| c.id == id) {
                    *slot = updated_code.clone();
                }
                Ok(updated_code)
            }
            CodeStorageMode::Standalone => {
                let current = {
                    let state = self.state.lock().unwrap();
                    state.codes.iter().find(|c| c.id == id).cloned()
                };
                let Some(mut code) = current else {
                    return Err(ActionError::Validation(MSG_CODE_NOT_FOUND.into()));
                };
                for (key, value) in updates {
                    if Code::RESERVED_KEYS.contains(&key.as_str()) {
                        continue;
                    }
                    code.payload.insert(key, value);
                }

                let stored = self.remote.update_code(&code).await?;

                let mut state = self.state.lock().unwrap();
                if let Some(slot) = state.codes.iter_mut().find(|c| c.id == id) {
                    *slot = stored.clone();
                }
                Ok(stored)
            }
        }
    }

    async fn try_delete_code(&self, id: &str) -> Result<(), ActionError> {
        let user = self.require_user()?;
        self.ensure_online().await?;

        match self.mode {
            CodeStorageMode::Embedded => {
                let mut updated_user = user;
                updated_user.codes.retain(|c| c.id != id);
                let stored_user = self.remote.update_user(&updated_user).await?;

                let mut state = self.state.lock().unwrap();
                state.user = Some(stored_user);
                state.codes.retain(|c| c.id != id);
            }
            CodeStorageMode::Standalone => {
                self.remote.delete_code(id).await?;
                self.state.lock().unwrap().codes.retain(|c| c.id != id);
            }
        }
        Ok(())
    }

    /// The remote half of logout. Never fails; a `false` return means the
    /// client is logging out locally only.
    async fn try_remote_logout(&self, user: &User) -> bool {
        let connected = self.remote.probe().await;
        self.state.lock().unwrap().server_connected = connected;
        if !connected {
            return false;
        }

        let result = match self.mode {
            CodeStorageMode::Embedded => {
                let mut updated = user.clone();
                updated.last_logout_at = Some(Utc::now());
                self.remote.update_user(&updated).await.map(|_| ())
            }
            CodeStorageMode::Standalone => {
                self.remote.delete_sessions(&user.id).await.map(|_| ())
            }
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("remote logout failed, clearing local session anyway: {e}");
                false
            }
        }
    }

    // ---- plumbing ---------------------------------------------------------

    fn begin(&self, label: &str) {
        let mut state = self.state.lock().unwrap();
        state.loading = Loading {
            active: true,
            label: label.to_string(),
        };
    }

    /// Clear the loading flag, toast the outcome, and hand the result back.
    fn finish<T>(&self, result: Result<T, ActionError>, ok_message: &str) -> Result<T, ActionError> {
        self.state.lock().unwrap().loading = Loading::default();
        match &result {
            Ok(_) => self.toasts.success(ok_message),
            Err(e) => self.toasts.error(e.to_string()),
        }
        result
    }

    /// Probe before the primary call(s); a failed probe aborts the operation.
    async fn ensure_online(&self) -> Result<(), ActionError> {
        let connected = self.remote.probe().await;
        self.state.lock().unwrap().server_connected = connected;
        if connected {
            Ok(())
        } else {
            Err(ActionError::Connectivity)
        }
    }

    fn require_user(&self) -> Result<User, ActionError> {
        self.current_user()
            .ok_or_else(|| ActionError::Validation(MSG_NO_SESSION.into()))
    }

    /// Mirror the signed-in user to the session cache. A cache write that
    /// fails after a successful remote call is logged, not surfaced.
    fn persist(&self, user: &User) {
        if let Err(e) = self.cache.save(user) {
            warn!("failed to persist session cache: {e}");
        }
    }

    fn clear_cache(&self) {
        if let Err(e) = self.cache.clear() {
            warn!("failed to clear session cache: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::MemoryRemote;
    use crate::toast::ToastKind;

    fn payload(label: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("label".into(), Value::String(label.into()));
        map
    }

    fn test_app(mode: CodeStorageMode) -> (App<MemoryRemote>, MemoryRemote, tempfile::TempDir) {
        let remote = MemoryRemote::new();
        let dir = tempfile::tempdir().unwrap();
        let cache = SessionCache::new(dir.path().to_path_buf());
        let app = App::new(remote.clone(), cache, mode);
        (app, remote, dir)
    }

    async fn signed_in(
        mode: CodeStorageMode,
    ) -> (App<MemoryRemote>, MemoryRemote, tempfile::TempDir, User) {
        let (app, remote, dir) = test_app(mode);
        remote.seed_user(User::new_account("a@x.com", "p1"));
        let user = app.login("a@x.com", "p1").await.unwrap();
        (app, remote, dir, user)
    }

    #[tokio::test]
    async fn test_login_sets_user_and_persists_cache() {
        let (app, remote, dir) = test_app(CodeStorageMode::Embedded);
        remote.seed_user(User::new_account("a@x.com", "p1"));

        let user = app.login("a@x.com", "p1").await.unwrap();
        assert!(user.last_login_at.is_some());
        assert_eq!(app.current_user().unwrap().id, user.id);
        assert!(!app.loading().active);

        let cached = SessionCache::new(dir.path().to_path_buf())
            .load()
            .unwrap()
            .unwrap();
        assert_eq!(cached, user);

        let toast = app.toasts().current();
        assert!(toast.visible);
        assert_eq!(toast.message, "Welcome back!");
        assert_eq!(toast.kind, ToastKind::Success);
    }

    #[tokio::test]
    async fn test_login_failure_never_reveals_which_field_was_wrong() {
        let (app, remote, _dir) = test_app(CodeStorageMode::Embedded);
        remote.seed_user(User::new_account("a@x.com", "p1"));

        let wrong_password = app.login("a@x.com", "nope").await.unwrap_err();
        let unknown_email = app.login("b@x.com", "p1").await.unwrap_err();

        assert_eq!(
            wrong_password,
            ActionError::Validation("Invalid email or password".into())
        );
        assert_eq!(wrong_password, unknown_email);
        assert!(app.current_user().is_none());
    }

    #[tokio::test]
    async fn test_probe_failure_short_circuits_every_operation() {
        let (app, remote, _dir, _user) = signed_in(CodeStorageMode::Embedded).await;
        remote.set_online(false);
        let baseline = remote.primary_calls();

        assert_eq!(
            app.login("a@x.com", "p1").await.unwrap_err(),
            ActionError::Connectivity
        );
        assert_eq!(
            app.signup("b@x.com", "p2").await.unwrap_err(),
            ActionError::Connectivity
        );
        assert_eq!(
            app.update_profile(ProfileUpdate::default()).await.unwrap_err(),
            ActionError::Connectivity
        );
        assert_eq!(
            app.create_code(payload("x")).await.unwrap_err(),
            ActionError::Connectivity
        );
        assert_eq!(app.get_user_codes().await.unwrap_err(), ActionError::Connectivity);
        assert_eq!(
            app.update_code("c1", payload("y")).await.unwrap_err(),
            ActionError::Connectivity
        );
        assert_eq!(app.delete_code("c1").await.unwrap_err(), ActionError::Connectivity);

        // No primary call was issued by any of the failed operations.
        assert_eq!(remote.primary_calls(), baseline);
        assert!(!app.server_connected());
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_issues_no_create() {
        let (app, remote, _dir) = test_app(CodeStorageMode::Embedded);
        remote.seed_user(User::new_account("a@x.com", "p1"));

        let err = app.signup("a@x.com", "other").await.unwrap_err();
        assert_eq!(err, ActionError::Validation("Email already registered".into()));

        // Only the original account exists.
        let matches = remote.find_users_by_email("a@x.com").await.unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn test_signup_creates_account_with_defaults() {
        let (app, _remote, _dir) = test_app(CodeStorageMode::Embedded);

        let created = app.signup("new@x.com", "secret").await.unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.generations_left, User::INITIAL_GENERATIONS);
        assert_eq!(created.subscription, "free");
        assert!(created.codes.is_empty());

        // Signup does not open a local session.
        assert!(app.current_user().is_none());
    }

    #[tokio::test]
    async fn test_signup_standalone_records_a_session() {
        let (app, remote, _dir) = test_app(CodeStorageMode::Standalone);

        let created = app.signup("new@x.com", "secret").await.unwrap();
        assert_eq!(remote.sessions_for(&created.id).len(), 1);
        assert!(app.current_user().is_none());
    }

    #[tokio::test]
    async fn test_create_then_list_codes_embedded() {
        let (app, _remote, _dir, user) = signed_in(CodeStorageMode::Embedded).await;

        let code = app.create_code(payload("wifi")).await.unwrap();
        assert_eq!(code.user_id, user.id);
        assert!(!code.id.is_empty());

        let codes = app.get_user_codes().await.unwrap();
        assert!(codes.iter().any(|c| c.id == code.id && c.user_id == user.id));
        assert_eq!(app.codes(), codes);
    }

    #[tokio::test]
    async fn test_create_then_list_codes_standalone() {
        let (app, _remote, _dir, user) = signed_in(CodeStorageMode::Standalone).await;

        let code = app.create_code(payload("wifi")).await.unwrap();
        assert_eq!(code.user_id, user.id);

        let codes = app.get_user_codes().await.unwrap();
        assert!(codes.iter().any(|c| c.id == code.id && c.user_id == user.id));
    }

    #[tokio::test]
    async fn test_update_code_merges_payload_only() {
        for mode in [CodeStorageMode::Embedded, CodeStorageMode::Standalone] {
            let (app, _remote, _dir, user) = signed_in(mode).await;
            let code = app.create_code(payload("old")).await.unwrap();

            let updated = app.update_code(&code.id, payload("new")).await.unwrap();
            assert_eq!(updated.payload["label"], "new");
            assert_eq!(updated.id, code.id);
            assert_eq!(updated.user_id, user.id);
            assert_eq!(updated.created_at, code.created_at);

            let listed = app.codes();
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].payload["label"], "new");
        }
    }

    #[tokio::test]
    async fn test_update_unknown_code_is_a_validation_error() {
        let (app, _remote, _dir, _user) = signed_in(CodeStorageMode::Embedded).await;
        let err = app.update_code("ghost", payload("x")).await.unwrap_err();
        assert_eq!(err, ActionError::Validation("Code not found".into()));
    }

    #[tokio::test]
    async fn test_payload_cannot_reassign_code_ownership() {
        for mode in [CodeStorageMode::Embedded, CodeStorageMode::Standalone] {
            let (app, _remote, _dir, user) = signed_in(mode).await;

            let mut smuggled = payload("wifi");
            smuggled.insert("userId".into(), Value::String("someone-else".into()));
            let code = app.create_code(smuggled).await.unwrap();
            assert_eq!(code.user_id, user.id);

            let mut hijack = payload("new");
            hijack.insert("userId".into(), Value::String("someone-else".into()));
            hijack.insert("id".into(), Value::String("other".into()));
            let updated = app.update_code(&code.id, hijack).await.unwrap();
            assert_eq!(updated.user_id, user.id);
            assert_eq!(updated.id, code.id);
            assert_eq!(updated.payload["label"], "new");
            assert!(!updated.payload.contains_key("userId"));

            // The wire form carries the real owner exactly once and the
            // stored record still decodes.
            let json = serde_json::to_value(&updated).unwrap();
            assert_eq!(json["userId"], Value::String(user.id.clone()));

            let listed = app.get_user_codes().await.unwrap();
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].user_id, user.id);
        }
    }

    #[tokio::test]
    async fn test_delete_code_removes_entry() {
        let (app, remote, _dir, user) = signed_in(CodeStorageMode::Embedded).await;
        let code = app.create_code(payload("wifi")).await.unwrap();

        app.delete_code(&code.id).await.unwrap();
        assert!(app.codes().is_empty());
        assert!(remote.stored_user(&user.id).unwrap().codes.is_empty());
    }

    #[tokio::test]
    async fn test_code_operations_require_a_session() {
        let (app, _remote, _dir) = test_app(CodeStorageMode::Embedded);
        let err = app.create_code(payload("x")).await.unwrap_err();
        assert_eq!(err, ActionError::Validation("No user logged in".into()));
    }

    #[tokio::test]
    async fn test_update_profile_merges_and_persists() {
        let (app, _remote, dir, _user) = signed_in(CodeStorageMode::Embedded).await;

        let updated = app
            .update_profile(ProfileUpdate {
                subscription: Some("pro".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.subscription, "pro");
        // Unset fields survive the merge.
        assert_eq!(updated.email, "a@x.com");

        let cached = SessionCache::new(dir.path().to_path_buf())
            .load()
            .unwrap()
            .unwrap();
        assert_eq!(cached.subscription, "pro");
    }

    #[tokio::test]
    async fn test_logout_is_infallible_even_when_remote_is_down() {
        let (app, remote, dir, _user) = signed_in(CodeStorageMode::Embedded).await;
        app.create_code(payload("wifi")).await.unwrap();
        remote.set_online(false);

        app.logout().await.unwrap();

        assert!(app.current_user().is_none());
        assert!(app.codes().is_empty());
        assert!(SessionCache::new(dir.path().to_path_buf())
            .load()
            .unwrap()
            .is_none());
        assert_eq!(app.toasts().current().message, "Logged out locally");
    }

    #[tokio::test]
    async fn test_logout_online_stamps_last_logout() {
        let (app, remote, _dir, user) = signed_in(CodeStorageMode::Embedded).await;

        app.logout().await.unwrap();

        let stored = remote.stored_user(&user.id).unwrap();
        assert!(stored.last_logout_at.is_some());
        assert_eq!(app.toasts().current().message, "Logged out successfully");
    }

    #[tokio::test]
    async fn test_logout_standalone_deletes_sessions() {
        let (app, remote, _dir) = test_app(CodeStorageMode::Standalone);
        let created = app.signup("a@x.com", "p1").await.unwrap();
        app.login("a@x.com", "p1").await.unwrap();
        assert_eq!(remote.sessions_for(&created.id).len(), 1);

        app.logout().await.unwrap();
        assert!(remote.sessions_for(&created.id).is_empty());
    }

    #[tokio::test]
    async fn test_init_auth_restores_a_valid_session() {
        let (first, remote, dir, user) = signed_in(CodeStorageMode::Embedded).await;
        drop(first);

        let cache = SessionCache::new(dir.path().to_path_buf());
        let app = App::new(remote, cache, CodeStorageMode::Embedded);

        let restored = app.init_auth().await.unwrap();
        assert_eq!(restored.id, user.id);
        assert_eq!(app.current_user().unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_init_auth_discards_a_stale_cache_entry() {
        let (app, _remote, dir) = test_app(CodeStorageMode::Embedded);

        // Cache a user the remote never heard of.
        let mut ghost = User::new_account("ghost@x.com", "p1");
        ghost.id = "ghost".to_string();
        let cache = SessionCache::new(dir.path().to_path_buf());
        cache.save(&ghost).unwrap();

        assert!(app.init_auth().await.is_none());
        assert!(app.current_user().is_none());
        assert!(cache.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_init_auth_keeps_the_cache_when_offline() {
        let (app, remote, dir) = test_app(CodeStorageMode::Embedded);

        let mut user = User::new_account("a@x.com", "p1");
        user.id = "u1".to_string();
        let cache = SessionCache::new(dir.path().to_path_buf());
        cache.save(&user).unwrap();

        remote.set_online(false);
        assert!(app.init_auth().await.is_none());

        // The entry survives for a later online startup.
        assert!(cache.load().unwrap().is_some());
        assert!(!app.server_connected());
    }

    #[tokio::test]
    async fn test_server_error_surfaces_status_in_the_toast() {
        let (app, remote, _dir, _user) = signed_in(CodeStorageMode::Embedded).await;
        remote.fail_with_status(Some(500));

        let err = app.get_user_codes().await.unwrap_err();
        assert_eq!(err, ActionError::Server { status: 500 });

        let toast = app.toasts().current();
        assert_eq!(toast.message, "Server error: 500");
        assert_eq!(toast.kind, ToastKind::Error);
    }

    #[tokio::test]
    async fn test_guard_follows_session_presence() {
        let (app, remote, _dir) = test_app(CodeStorageMode::Embedded);
        remote.seed_user(User::new_account("a@x.com", "p1"));

        assert_eq!(app.guard(Route::Dashboard), Access::Redirect(Route::Login));
        assert_eq!(app.guard(Route::Home), Access::Allow);

        app.login("a@x.com", "p1").await.unwrap();
        assert_eq!(app.guard(Route::Dashboard), Access::Allow);
    }

    #[tokio::test]
    async fn test_set_generations_left_is_local_only() {
        let (app, remote, _dir, user) = signed_in(CodeStorageMode::Embedded).await;
        let baseline = remote.primary_calls();

        app.set_generations_left(1);
        assert_eq!(app.current_user().unwrap().generations_left, 1);
        assert_eq!(remote.primary_calls(), baseline);
        // The remote copy is untouched until the next profile update.
        assert_eq!(
            remote.stored_user(&user.id).unwrap().generations_left,
            User::INITIAL_GENERATIONS
        );
    }
}
