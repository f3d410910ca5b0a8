//! Canonical User Store
//!
//! The primary node's authoritative collection. Every operation takes the same
//! mutex for its whole duration, so a `list()` never observes a half-applied
//! mutation and mutations are serialized with each other.

use super::types::{IdPolicy, StoreError, User, UserFields};

use tokio::sync::Mutex;

struct DirectoryState {
    users: Vec<User>,
    /// Highest id ever issued or inserted. Only consulted by `IdPolicy::Monotonic`.
    highest_id: i64,
}

/// The primary's writable collection of users.
pub struct UserDirectory {
    state: Mutex<DirectoryState>,
    id_policy: IdPolicy,
}

impl UserDirectory {
    pub fn new(id_policy: IdPolicy) -> Self {
        Self::with_users(id_policy, Vec::new())
    }

    /// Builds a store pre-populated with `users`, kept in the given order.
    pub fn with_users(id_policy: IdPolicy, users: Vec<User>) -> Self {
        let highest_id = users.iter().map(|u| u.id).max().unwrap_or(0);
        Self {
            state: Mutex::new(DirectoryState { users, highest_id }),
            id_policy,
        }
    }

    pub fn id_policy(&self) -> IdPolicy {
        self.id_policy
    }

    pub async fn list(&self) -> Vec<User> {
        self.state.lock().await.users.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.users.is_empty()
    }

    /// Appends a new record and returns it with its assigned id.
    pub async fn create(&self, fields: UserFields) -> User {
        let mut state = self.state.lock().await;

        let id = match self.id_policy {
            IdPolicy::CountPlusOne => state.users.len() as i64 + 1,
            IdPolicy::Monotonic => state.highest_id + 1,
        };
        state.highest_id = state.highest_id.max(id);

        let user = fields.into_user(id);
        state.users.push(user.clone());

        tracing::debug!("Created user {}", id);
        user
    }

    /// Replaces the payload of the first record with `id`.
    ///
    /// The stored record always carries `id`; nothing in `fields` can move a
    /// record to another identity.
    pub async fn update(&self, id: i64, fields: UserFields) -> Result<User, StoreError> {
        let mut state = self.state.lock().await;

        let slot = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound(id))?;

        *slot = fields.into_user(id);
        tracing::debug!("Updated user {}", id);
        Ok(slot.clone())
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;

        let idx = state
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::NotFound(id))?;

        state.users.remove(idx);
        tracing::debug!("Deleted user {}", id);
        Ok(())
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new(IdPolicy::default())
    }
}
