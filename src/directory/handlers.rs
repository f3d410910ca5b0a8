use axum::{
    Json,
    body::Bytes,
    extract::{Extension, Path, rejection::PathRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::protocol::{
    ErrorResponse, MSG_DELETED, MSG_INVALID_DATA, MSG_INVALID_ID, MSG_NOT_FOUND, MessageResponse,
    UserRequest,
};
use super::store::UserDirectory;
use super::types::StoreError;

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

fn store_error_response(err: StoreError) -> Response {
    match err {
        StoreError::NotFound(_) => error_response(StatusCode::NOT_FOUND, MSG_NOT_FOUND),
    }
}

pub async fn handle_list_users(
    Extension(directory): Extension<Arc<UserDirectory>>,
) -> Response {
    (StatusCode::OK, Json(directory.list().await)).into_response()
}

pub async fn handle_create_user(
    Extension(directory): Extension<Arc<UserDirectory>>,
    body: Bytes,
) -> Response {
    let fields = match UserRequest::decode(&body) {
        Ok(fields) => fields,
        Err(e) => {
            tracing::debug!("Rejected create body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, MSG_INVALID_DATA);
        }
    };

    let user = directory.create(fields).await;
    tracing::info!("Created user {} ({})", user.id, user.username);
    (StatusCode::CREATED, Json(user)).into_response()
}

pub async fn handle_update_user(
    Extension(directory): Extension<Arc<UserDirectory>>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Response {
    let Ok(Path(id)) = id else {
        return error_response(StatusCode::BAD_REQUEST, MSG_INVALID_ID);
    };

    let fields = match UserRequest::decode(&body) {
        Ok(fields) => fields,
        Err(e) => {
            tracing::debug!("Rejected update body for {}: {}", id, e);
            return error_response(StatusCode::BAD_REQUEST, MSG_INVALID_DATA);
        }
    };

    match directory.update(id, fields).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => store_error_response(e),
    }
}

pub async fn handle_delete_user(
    Extension(directory): Extension<Arc<UserDirectory>>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let Ok(Path(id)) = id else {
        return error_response(StatusCode::BAD_REQUEST, MSG_INVALID_ID);
    };

    match directory.delete(id).await {
        Ok(()) => {
            tracing::info!("Deleted user {}", id);
            (
                StatusCode::OK,
                Json(MessageResponse {
                    message: MSG_DELETED.to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => store_error_response(e),
    }
}

/// Writes every current record as its own JSON object, one per line
/// (newline-delimited JSON, not a single JSON document).
///
/// Returns immediately with whatever the collection holds right now; there is
/// no waiting for changes.
pub async fn handle_long_poll(
    Extension(directory): Extension<Arc<UserDirectory>>,
) -> Response {
    let mut body = String::new();
    for user in directory.list().await {
        match serde_json::to_string(&user) {
            Ok(line) => {
                body.push_str(&line);
                body.push('\n');
            }
            Err(e) => {
                tracing::error!("Failed to serialize user {}: {}", user.id, e);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        body,
    )
        .into_response()
}
