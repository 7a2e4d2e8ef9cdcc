/// Integration tests for registration and credential checks

use std::sync::Arc;

use todo_shared::services::users::{UserDirectory, UserError};
use todo_shared::store::memory::MemoryStore;
use uuid::Uuid;

fn directory() -> UserDirectory {
    UserDirectory::new(Arc::new(MemoryStore::new()))
}

#[tokio::test]
async fn test_register_and_authenticate() {
    let users = directory();

    let user = users.register("alice@example.com", "secret123").await.unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert!(user.password_hash.starts_with("$argon2id$"));
    assert_ne!(user.password_hash, "secret123");

    let authenticated = users
        .authenticate("alice@example.com", "secret123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(authenticated.id, user.id);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let users = directory();
    users.register("dup@example.com", "secret123").await.unwrap();

    let result = users.register("dup@example.com", "different-pass").await;
    assert!(matches!(result, Err(UserError::Conflict)));

    // Original credentials still work
    assert!(users
        .authenticate("dup@example.com", "secret123")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_concurrent_duplicate_registration_yields_one_user() {
    let users = directory();

    let (a, b) = tokio::join!(
        users.register("race@example.com", "secret123"),
        users.register("race@example.com", "secret123"),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
    assert!(matches!(a.err().or(b.err()), Some(UserError::Conflict)));
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let users = directory();
    users.register("bob@example.com", "secret123").await.unwrap();

    assert!(users
        .authenticate("bob@example.com", "wrong-password")
        .await
        .unwrap()
        .is_none());
    assert!(users
        .authenticate("nobody@example.com", "secret123")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_find_by_id() {
    let users = directory();
    let user = users.register("carol@example.com", "secret123").await.unwrap();

    assert_eq!(users.find_by_id(user.id).await.unwrap().unwrap().email, "carol@example.com");
    assert!(users.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}
