//! Primary Directory Module
//!
//! The authoritative, writable collection of user records and its HTTP surface.
//!
//! ## Core Concepts
//! - **Single lock**: `UserDirectory` serializes list/create/update/delete behind one mutex.
//! - **Whole-record updates**: an update replaces the payload wholesale; there is no field merge.
//! - **Id policy**: new ids follow `IdPolicy` (count + 1 by default, monotonic on request).
//! - **Snapshot source**: `GET /users` is what replicas pull and reconcile against.

pub mod handlers;
pub mod protocol;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

use axum::{Extension, Router, routing::get, routing::put};
use std::sync::Arc;

use handlers::{
    handle_create_user, handle_delete_user, handle_list_users, handle_long_poll,
    handle_update_user,
};
use protocol::{ENDPOINT_LONG_POLL, ENDPOINT_USER, ENDPOINT_USERS};
use store::UserDirectory;

/// Routes served by the primary node.
pub fn router(directory: Arc<UserDirectory>) -> Router {
    Router::new()
        .route(
            ENDPOINT_USERS,
            get(handle_list_users).post(handle_create_user),
        )
        .route(
            ENDPOINT_USER,
            put(handle_update_user).delete(handle_delete_user),
        )
        .route(ENDPOINT_LONG_POLL, get(handle_long_poll))
        .layer(Extension(directory))
}
