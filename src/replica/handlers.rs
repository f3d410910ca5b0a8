use axum::{Json, extract::Extension, http::StatusCode};
use std::sync::Arc;

use super::store::MirrorStore;
use super::sync::{SyncAgent, SyncStatus};
use crate::directory::types::User;

/// Serves the last successfully reconciled mirror. Sync failures never
/// surface here.
pub async fn handle_list_replica(
    Extension(mirror): Extension<Arc<MirrorStore>>,
) -> (StatusCode, Json<Vec<User>>) {
    (StatusCode::OK, Json(mirror.list().await))
}

pub async fn handle_sync_status(
    Extension(agent): Extension<Arc<SyncAgent>>,
) -> (StatusCode, Json<SyncStatus>) {
    (StatusCode::OK, Json(agent.status()))
}
