//! Mirror Store
//!
//! The replica's read-only-to-clients copy of the primary's users. Clients only
//! ever read it; the sync agent is the only writer, through `reconcile`.
//!
//! ## Reconciliation
//! One pass converges the mirror onto a snapshot:
//! 1. Index the snapshot by id (last entry wins on duplicate ids).
//! 2. Walk the mirror: replace records whose payload differs, leave identical
//!    ones alone, mark records missing from the snapshot.
//! 3. Drop the marked records.
//! 4. Append snapshot records whose id the mirror does not hold yet.
//!
//! The whole pass runs under the write lock, so `list()` sees either the state
//! before or after a pass, never a mix.

use crate::directory::types::User;

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// What a single reconciliation pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.updated == 0 && self.removed == 0
    }

    pub fn total(&self) -> usize {
        self.added + self.updated + self.removed
    }
}

pub struct MirrorStore {
    users: RwLock<Vec<User>>,
    /// Cumulative count of replaced, appended and removed records.
    writes: AtomicU64,
}

impl MirrorStore {
    pub fn new() -> Self {
        Self::with_users(Vec::new())
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users),
            writes: AtomicU64::new(0),
        }
    }

    pub async fn list(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Converges the mirror onto `snapshot`. Calling it again with the same
    /// snapshot changes nothing.
    pub async fn reconcile(&self, snapshot: Vec<User>) -> ReconcileReport {
        let mut index: HashMap<i64, User> = HashMap::with_capacity(snapshot.len());
        let mut order: Vec<i64> = Vec::with_capacity(snapshot.len());
        for user in snapshot {
            if index.insert(user.id, user.clone()).is_none() {
                order.push(user.id);
            }
        }

        let mut report = ReconcileReport::default();
        let mut mirror = self.users.write().await;

        mirror.retain_mut(|current| match index.get(&current.id) {
            Some(incoming) => {
                if !current.same_payload(incoming) {
                    *current = incoming.clone();
                    report.updated += 1;
                }
                true
            }
            None => {
                report.removed += 1;
                false
            }
        });

        let present: HashSet<i64> = mirror.iter().map(|u| u.id).collect();
        for id in order {
            if present.contains(&id) {
                continue;
            }
            if let Some(user) = index.remove(&id) {
                mirror.push(user);
                report.added += 1;
            }
        }

        self.writes
            .fetch_add(report.total() as u64, Ordering::SeqCst);

        report
    }
}

impl Default for MirrorStore {
    fn default() -> Self {
        Self::new()
    }
}
