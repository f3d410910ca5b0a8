//! Directory Data Types
//!
//! The record shape shared by the primary and the replica, plus the typed
//! outcome of primary-side mutations.

use serde::{Deserialize, Serialize};

/// A single user record.
///
/// `id` is the identity; `name` and `username` are the mutable payload.
/// This is also the exact wire shape of one element of a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
}

impl User {
    pub fn new(id: i64, name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            username: username.into(),
        }
    }

    /// True when the payload (everything except `id`) matches.
    pub fn same_payload(&self, other: &User) -> bool {
        self.name == other.name && self.username == other.username
    }
}

/// The client-supplied part of a record, used by create and update.
///
/// Missing fields decode as empty strings; unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserFields {
    pub name: String,
    pub username: String,
}

impl UserFields {
    pub fn new(name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
        }
    }

    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            name: self.name,
            username: self.username,
        }
    }
}

/// How the primary picks the id of a newly created record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    /// `id = current count + 1`. May hand out an id that is still present
    /// after an earlier delete.
    #[default]
    CountPlusOne,
    /// One more than the highest id this store has ever issued or seen.
    Monotonic,
}

impl std::str::FromStr for IdPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" | "count-plus-one" => Ok(IdPolicy::CountPlusOne),
            "monotonic" => Ok(IdPolicy::Monotonic),
            other => Err(anyhow::anyhow!("Unknown id policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("user {0} not found")]
    NotFound(i64),
}
