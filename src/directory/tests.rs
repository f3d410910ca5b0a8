//! Directory Module Tests
//!
//! Validates the primary store's CRUD semantics and its handlers.
//!
//! ## Test Scopes
//! - **UserDirectory**: id assignment, whole-record update, NotFound handling, atomicity.
//! - **Handlers**: status codes and bodies for success, 400 and 404 paths.
//!
//! *Note: non-integer path ids are rejected by the axum `Path` extractor and are covered in integration tests.*

#[cfg(test)]
mod tests {
    use crate::directory::handlers::{
        handle_create_user, handle_delete_user, handle_list_users, handle_long_poll,
        handle_update_user,
    };
    use crate::directory::protocol::UserRequest;
    use crate::directory::store::UserDirectory;
    use crate::directory::types::{IdPolicy, StoreError, User, UserFields};
    use axum::body::{Bytes, to_bytes};
    use axum::extract::{Extension, Path};
    use axum::http::{StatusCode, header};
    use std::sync::Arc;

    fn seeded() -> UserDirectory {
        UserDirectory::with_users(IdPolicy::CountPlusOne, vec![User::new(1, "Ana", "ana1")])
    }

    // ============================================================
    // STORE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_create_assigns_count_plus_one() {
        // ARRANGE
        let directory = seeded();

        // ACT
        let bob = directory.create(UserFields::new("Bob", "bob1")).await;

        // ASSERT
        assert_eq!(bob, User::new(2, "Bob", "bob1"));
        assert_eq!(directory.len().await, 2);
    }

    #[tokio::test]
    async fn test_create_on_empty_store_starts_at_one() {
        let directory = UserDirectory::default();

        let first = directory.create(UserFields::new("Ana", "ana1")).await;

        assert_eq!(first.id, 1);
        assert!(!directory.is_empty().await);
    }

    #[tokio::test]
    async fn test_count_plus_one_can_reuse_a_present_id() {
        // ARRANGE: ids 1 and 2, then drop 1
        let directory = UserDirectory::new(IdPolicy::CountPlusOne);
        directory.create(UserFields::new("Ana", "ana1")).await;
        directory.create(UserFields::new("Bob", "bob1")).await;
        directory.delete(1).await.unwrap();

        // ACT
        let carl = directory.create(UserFields::new("Carl", "carl1")).await;

        // ASSERT: count was 1, so the new record collides with Bob
        assert_eq!(carl.id, 2);
        let ids: Vec<i64> = directory.list().await.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 2]);
    }

    #[tokio::test]
    async fn test_monotonic_never_reuses_deleted_id() {
        let directory = UserDirectory::new(IdPolicy::Monotonic);
        directory.create(UserFields::new("Ana", "ana1")).await;
        directory.create(UserFields::new("Bob", "bob1")).await;
        directory.delete(2).await.unwrap();

        let carl = directory.create(UserFields::new("Carl", "carl1")).await;

        assert_eq!(carl.id, 3);
    }

    #[tokio::test]
    async fn test_monotonic_continues_after_seeded_ids() {
        let directory =
            UserDirectory::with_users(IdPolicy::Monotonic, vec![User::new(7, "Ana", "ana1")]);

        let next = directory.create(UserFields::new("Bob", "bob1")).await;

        assert_eq!(next.id, 8);
        assert_eq!(directory.id_policy(), IdPolicy::Monotonic);
    }

    #[tokio::test]
    async fn test_update_replaces_whole_payload_and_keeps_id() {
        let directory = seeded();

        let updated = directory
            .update(1, UserFields::new("Ana K", "ana1"))
            .await
            .unwrap();

        assert_eq!(updated, User::new(1, "Ana K", "ana1"));
        assert_eq!(directory.list().await, vec![User::new(1, "Ana K", "ana1")]);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found_and_leaves_state() {
        let directory = seeded();
        let before = directory.list().await;

        let result = directory.update(42, UserFields::new("Ghost", "ghost")).await;

        assert_eq!(result, Err(StoreError::NotFound(42)));
        assert_eq!(directory.list().await, before);
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found_the_second_time() {
        let directory = seeded();

        assert!(directory.delete(1).await.is_ok());
        assert_eq!(directory.delete(1).await, Err(StoreError::NotFound(1)));
        assert!(directory.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_leaves_state() {
        let directory = seeded();

        let result = directory.delete(9).await;

        assert!(result.is_err());
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_serialized() {
        // ARRANGE
        let directory = Arc::new(UserDirectory::new(IdPolicy::CountPlusOne));

        // ACT: 50 creates racing each other
        let mut handles = Vec::new();
        for i in 0..50 {
            let directory = directory.clone();
            handles.push(tokio::spawn(async move {
                directory
                    .create(UserFields::new(format!("User {}", i), format!("user{}", i)))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // ASSERT: every create saw a distinct count, so ids are exactly 1..=50
        let mut ids: Vec<i64> = directory.list().await.iter().map(|u| u.id).collect();
        ids.sort();
        assert_eq!(ids, (1..=50).collect::<Vec<i64>>());
    }

    // ============================================================
    // HANDLER TESTS
    // ============================================================

    #[tokio::test]
    async fn test_handle_create_returns_created() {
        let directory = Arc::new(seeded());

        let response = handle_create_user(
            Extension(directory.clone()),
            Bytes::from_static(br#"{"name": "Bob", "username": "bob1"}"#),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let user: User = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(user, User::new(2, "Bob", "bob1"));
    }

    #[tokio::test]
    async fn test_handle_update_unknown_returns_not_found() {
        let directory = Arc::new(seeded());

        let response = handle_update_user(
            Extension(directory),
            Ok(Path(5)),
            Bytes::from_static(br#"{"name": "X", "username": "x"}"#),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "user not found");
    }

    #[tokio::test]
    async fn test_handle_create_accepts_empty_object() {
        // ARRANGE
        let directory = Arc::new(seeded());

        // ACT: structurally valid, every field missing
        let response =
            handle_create_user(Extension(directory.clone()), Bytes::from_static(b"{}")).await;

        // ASSERT: missing fields decode as empty strings
        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let user: User = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(user, User::new(2, "", ""));
    }

    #[tokio::test]
    async fn test_handle_update_with_partial_body_replaces_whole_record() {
        let directory = Arc::new(seeded());

        let response = handle_update_user(
            Extension(directory.clone()),
            Ok(Path(1)),
            Bytes::from_static(br#"{"name": "Ana K"}"#),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(directory.list().await, vec![User::new(1, "Ana K", "")]);
    }

    #[tokio::test]
    async fn test_handle_update_rejects_mistyped_id_in_body() {
        // ARRANGE
        let directory = Arc::new(seeded());

        // ACT
        let response = handle_update_user(
            Extension(directory.clone()),
            Ok(Path(1)),
            Bytes::from_static(br#"{"id": "x", "name": "Ana K", "username": "a"}"#),
        )
        .await;

        // ASSERT: 400 and nothing changed
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "invalid user data");
        assert_eq!(directory.list().await, vec![User::new(1, "Ana", "ana1")]);
    }

    #[tokio::test]
    async fn test_handle_update_body_id_does_not_move_record() {
        let directory = Arc::new(seeded());

        let response = handle_update_user(
            Extension(directory.clone()),
            Ok(Path(1)),
            Bytes::from_static(br#"{"id": 7, "name": "Ana K", "username": "ana1"}"#),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(directory.list().await, vec![User::new(1, "Ana K", "ana1")]);
    }

    #[tokio::test]
    async fn test_handle_create_rejects_non_object_bodies() {
        let directory = Arc::new(seeded());

        let bodies: [&[u8]; 4] = [b"{not json", b"", b"[1, 2]", br#"{"name": 5}"#];
        for body in bodies {
            let response =
                handle_create_user(Extension(directory.clone()), Bytes::copy_from_slice(body))
                    .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn test_handle_delete_returns_message() {
        let directory = Arc::new(seeded());

        let response = handle_delete_user(Extension(directory.clone()), Ok(Path(1))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["message"].is_string());
        assert!(directory.is_empty().await);
    }

    #[tokio::test]
    async fn test_handle_list_returns_array() {
        let directory = Arc::new(seeded());

        let response = handle_list_users(Extension(directory)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let users: Vec<User> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(users, vec![User::new(1, "Ana", "ana1")]);
    }

    #[tokio::test]
    async fn test_handle_long_poll_dumps_one_record_per_line() {
        let directory = Arc::new(seeded());
        directory.create(UserFields::new("Bob", "bob1")).await;

        let response = handle_long_poll(Extension(directory)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/x-ndjson"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        let users: Vec<User> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(
            users,
            vec![User::new(1, "Ana", "ana1"), User::new(2, "Bob", "bob1")]
        );
    }

    #[tokio::test]
    async fn test_handle_long_poll_on_empty_store_is_empty_body() {
        let directory = Arc::new(UserDirectory::default());

        let response = handle_long_poll(Extension(directory)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_user_fields_ignore_stray_id() {
        let fields: UserFields =
            serde_json::from_str(r#"{"id": 99, "name": "Ana", "username": "ana1"}"#).unwrap();
        assert_eq!(fields, UserFields::new("Ana", "ana1"));
    }

    #[test]
    fn test_request_decode_drops_id_and_unknown_fields() {
        let fields =
            UserRequest::decode(br#"{"id": 3, "name": "Bob", "username": "bob1", "x": true}"#)
                .unwrap();
        assert_eq!(fields, UserFields::new("Bob", "bob1"));
        assert!(UserRequest::decode(br#"{"id": 1.5}"#).is_err());
    }

    #[test]
    fn test_id_policy_parsing() {
        assert_eq!("count".parse::<IdPolicy>().unwrap(), IdPolicy::CountPlusOne);
        assert_eq!("monotonic".parse::<IdPolicy>().unwrap(), IdPolicy::Monotonic);
        assert!("random".parse::<IdPolicy>().is_err());
    }
}
