//! Replica Module
//!
//! A read-only mirror of the primary directory, kept consistent by pulling.
//!
//! ## Core Concepts
//! - **Pull, not push**: the primary never contacts the replica. `SyncAgent` periodically
//!   fetches the full collection through a `SnapshotSource`.
//! - **Reconciliation**: `MirrorStore::reconcile` diffs the mirror against the snapshot and
//!   applies additions, in-place updates and removals atomically.
//! - **Eventual consistency**: readers see the last successfully reconciled state; staleness is
//!   bounded by the sync interval plus fetch latency.
//! - **Transient failures**: a failed fetch leaves the mirror untouched and is retried after a
//!   shorter backoff delay.

pub mod handlers;
pub mod store;
pub mod sync;
pub mod transport;


use axum::{Extension, Router, routing::get};
use std::sync::Arc;

use handlers::{handle_list_replica, handle_sync_status};
use store::MirrorStore;
use sync::SyncAgent;

/// Public endpoint serving the mirrored collection.
pub const ENDPOINT_REPLICA: &str = "/replica";
/// Progress of the sync agent.
pub const ENDPOINT_SYNC_STATUS: &str = "/replica/status";

/// Routes served by the replica node.
pub fn router(mirror: Arc<MirrorStore>, agent: Arc<SyncAgent>) -> Router {
    Router::new()
        .route(ENDPOINT_REPLICA, get(handle_list_replica))
        .route(ENDPOINT_SYNC_STATUS, get(handle_sync_status))
        .layer(Extension(mirror))
        .layer(Extension(agent))
}
