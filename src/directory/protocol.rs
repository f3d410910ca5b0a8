//! Directory HTTP Protocol
//!
//! Endpoint paths, the request body shape and the small response envelopes
//! used by the primary node.

use super::types::UserFields;

use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Collection endpoint: list (GET) and create (POST).
pub const ENDPOINT_USERS: &str = "/users";
/// Single-record endpoint: update (PUT) and delete (DELETE).
pub const ENDPOINT_USER: &str = "/users/:id";
/// Snapshot dump of the current collection, one record per line.
pub const ENDPOINT_LONG_POLL: &str = "/long-poll";

// --- Messages ---

pub const MSG_INVALID_ID: &str = "invalid id";
pub const MSG_INVALID_DATA: &str = "invalid user data";
pub const MSG_NOT_FOUND: &str = "user not found";
pub const MSG_DELETED: &str = "user deleted";

// --- Data Transfer Objects ---

/// Body of a create or update request.
///
/// Shaped like a full record so a mistyped `id` is still a decoding error, but
/// the id itself is never used: the path (or the store) decides identity.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRequest {
    pub id: Option<i64>,
    pub name: String,
    pub username: String,
}

impl UserRequest {
    /// Decodes a request body regardless of its declared content type.
    pub fn decode(body: &[u8]) -> serde_json::Result<UserFields> {
        let req: UserRequest = serde_json::from_slice(body)?;
        Ok(UserFields {
            name: req.name,
            username: req.username,
        })
    }
}

/// Body of every 4xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Acknowledgment for a successful delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
