//! # HTTP-backed RemoteStore
//!
//! [`HttpRemote`] talks to the resource-collection backend over plain
//! HTTP(S) JSON: GET to read (with query-parameter filtering), POST to
//! create, PUT to update, DELETE to remove. No authentication headers and no
//! schema negotiation; payload shapes are the models in `store`.
//!
//! The users collection lives under `books` for embedded-mode backends (a
//! repurposed legacy collection) and under `users` for standalone-mode
//! backends; the path is fixed when the client is constructed from the
//! configured [`CodeStorageMode`]. The `codes` and `sessions` collections are
//! only reached in standalone mode.

use serde::de::DeserializeOwned;
use serde::Serialize;
use store::{Code, CodeStorageMode, Session, User};
use tracing::debug;

use crate::error::RemoteError;
use crate::remote::RemoteStore;

/// Remote store reached over HTTP.
#[derive(Clone, Debug)]
pub struct HttpRemote {
    client: reqwest::Client,
    base: String,
    users_path: &'static str,
}

impl HttpRemote {
    /// Client for the backend at `base_url`, with the users-collection path
    /// picked from the storage mode.
    pub fn new(base_url: impl Into<String>, mode: CodeStorageMode) -> Self {
        let base = base_url.into();
        let users_path = match mode {
            CodeStorageMode::Embedded => "books",
            CodeStorageMode::Standalone => "users",
        };
        Self {
            client: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            users_path,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RemoteError> {
        debug!(path, "remote GET");
        let resp = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await?;
        Self::expect_success(&resp)?;
        Ok(resp.json().await?)
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        debug!(path, "remote POST");
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        Self::expect_success(&resp)?;
        Ok(resp.json().await?)
    }

    async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        debug!(path, "remote PUT");
        let resp = self.client.put(self.url(path)).json(body).send().await?;
        Self::expect_success(&resp)?;
        Ok(resp.json().await?)
    }

    async fn delete(&self, path: &str) -> Result<(), RemoteError> {
        debug!(path, "remote DELETE");
        let resp = self.client.delete(self.url(path)).send().await?;
        Self::expect_success(&resp)?;
        Ok(())
    }

    fn expect_success(resp: &reqwest::Response) -> Result<(), RemoteError> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(RemoteError::Status {
                status: status.as_u16(),
            })
        }
    }
}

impl RemoteStore for HttpRemote {
    async fn probe(&self) -> bool {
        match self.client.get(self.url(self.users_path)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn find_users_by_email(&self, email: &str) -> Result<Vec<User>, RemoteError> {
        let users: Vec<User> = self
            .get_json(self.users_path, &[("email", email)])
            .await?;
        // Mock backends treat query filters as substring search; keep only
        // exact matches.
        Ok(users.into_iter().filter(|u| u.email == email).collect())
    }

    async fn get_user(&self, id: &str) -> Result<User, RemoteError> {
        self.get_json(&format!("{}/{}", self.users_path, id), &[])
            .await
    }

    async fn create_user(&self, user: &User) -> Result<User, RemoteError> {
        self.post_json(self.users_path, user).await
    }

    async fn update_user(&self, user: &User) -> Result<User, RemoteError> {
        self.put_json(&format!("{}/{}", self.users_path, user.id), user)
            .await
    }

    async fn list_codes(&self, user_id: &str) -> Result<Vec<Code>, RemoteError> {
        let codes: Vec<Code> = self.get_json("codes", &[("userId", user_id)]).await?;
        Ok(codes.into_iter().filter(|c| c.user_id == user_id).collect())
    }

    async fn create_code(&self, code: &Code) -> Result<Code, RemoteError> {
        self.post_json("codes", code).await
    }

    async fn update_code(&self, code: &Code) -> Result<Code, RemoteError> {
        self.put_json(&format!("codes/{}", code.id), code).await
    }

    async fn delete_code(&self, id: &str) -> Result<(), RemoteError> {
        self.delete(&format!("codes/{}", id)).await
    }

    async fn create_session(&self, session: &Session) -> Result<Session, RemoteError> {
        self.post_json("sessions", session).await
    }

    async fn delete_sessions(&self, user_id: &str) -> Result<usize, RemoteError> {
        let sessions: Vec<Session> =
            self.get_json("sessions", &[("userId", user_id)]).await?;
        let mut deleted = 0;
        for session in sessions.iter().filter(|s| s.user_id == user_id) {
            self.delete(&format!("sessions/{}", session.id)).await?;
            deleted += 1;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_path_follows_storage_mode() {
        let embedded = HttpRemote::new("http://localhost:3001", CodeStorageMode::Embedded);
        assert_eq!(embedded.url(embedded.users_path), "http://localhost:3001/books");

        let standalone =
            HttpRemote::new("http://localhost:3001/", CodeStorageMode::Standalone);
        assert_eq!(
            standalone.url(standalone.users_path),
            "http://localhost:3001/users"
        );
    }
}
