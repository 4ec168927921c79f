//! # Domain models for users, codes, and sessions
//!
//! Defines the records exchanged with the remote store and persisted in the
//! local session cache. These types are `Serialize + Deserialize` with
//! camelCase field names, matching the JSON the resource-collection backends
//! produce.
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`User`] | An account record. Owns its QR codes in embedded storage mode (`codes` array); in standalone mode the array stays empty and codes live in their own collection. |
//! | [`Code`] | A single QR/code record. `user_id` is set once at creation and never changes. The open payload (label, content, styling, whatever the generator produced) is kept as a flattened JSON map so round-trips are lossless. |
//! | [`Session`] | A login event, only tracked by standalone-mode backends. Deleted in bulk on logout. |
//!
//! Server-assigned `id` fields default to the empty string and are skipped
//! during serialization while empty, so create requests let the remote assign
//! the id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An account record as stored by the remote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned id; empty until the record has been created remotely.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub generations_left: u32,
    /// Plan name; the only observed value so far is `"free"`.
    #[serde(default = "default_subscription")]
    pub subscription: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_logout_at: Option<DateTime<Utc>>,
    /// Embedded-mode code storage. Standalone-mode records omit this.
    #[serde(default)]
    pub codes: Vec<Code>,
}

fn default_subscription() -> String {
    "free".to_string()
}

impl User {
    /// Number of generations a fresh account starts with.
    pub const INITIAL_GENERATIONS: u32 = 3;

    /// Build an account record for a signup request. The id stays empty so
    /// the remote assigns one.
    pub fn new_account(email: impl Into<String>, password: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            email: email.into(),
            password: password.into(),
            generations_left: Self::INITIAL_GENERATIONS,
            subscription: default_subscription(),
            created_at: now,
            last_login_at: Some(now),
            last_logout_at: None,
            codes: Vec::new(),
        }
    }
}

/// A QR/code record owned by exactly one user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Code {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Owner. Immutable after creation.
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    /// Everything else the generator attached to the code.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Code {
    /// Wire keys owned by the named fields. They must never appear in the
    /// flattened payload, or the serialized record would carry duplicate keys
    /// and a last-key-wins backend would accept a smuggled owner.
    pub const RESERVED_KEYS: [&'static str; 3] = ["id", "userId", "createdAt"];

    /// Build a code record for the given owner from an open payload.
    /// Reserved keys are stripped from the payload.
    pub fn new(user_id: impl Into<String>, mut payload: Map<String, Value>) -> Self {
        for key in Self::RESERVED_KEYS {
            payload.remove(key);
        }
        Self {
            id: String::new(),
            user_id: user_id.into(),
            created_at: Utc::now(),
            payload,
        }
    }
}

/// A login event, tracked only by standalone-mode backends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.into(),
            created_at: Utc::now(),
        }
    }
}
