//! Integration tests for `MySqlUserStore`.
//!
//! These run against a real MySQL server started with testcontainers and
//! need Docker: `cargo test -p tessera-repository -- --ignored`.

mod common;

use common::TestDatabase;
use tessera_core::{Email, NewUser, UserId};
use tessera_repository::{MySqlUserStore, UserStore};

fn new_user(email: &str) -> NewUser {
    NewUser {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: Email::new(email).unwrap(),
        bio: "hello".to_string(),
        password_hash: "hashed_password_123".to_string(),
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_insert_and_find_by_id() {
    let db = TestDatabase::new().await;
    let store = MySqlUserStore::new(db.pool());

    let mut tx = store.begin().await.unwrap();
    let saved = tx.insert_user(&new_user("test@example.com")).await.unwrap();
    tx.commit().await.unwrap();

    assert!(!saved.id.is_unset());
    assert!(!saved.is_active);

    let mut tx = store.begin().await.unwrap();
    let found = tx.find_user_by_id(saved.id).await.unwrap().expect("user");
    assert_eq!(found, saved);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_find_missing_rows() {
    let db = TestDatabase::new().await;
    let store = MySqlUserStore::new(db.pool());

    let mut tx = store.begin().await.unwrap();
    assert!(tx.find_user_by_id(UserId::new(999)).await.unwrap().is_none());
    let email = Email::new("nobody@example.com").unwrap();
    assert!(tx.find_user_by_email(&email).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_email_maps_to_email_used() {
    let db = TestDatabase::new().await;
    let store = MySqlUserStore::new(db.pool());

    let mut tx = store.begin().await.unwrap();
    tx.insert_user(&new_user("dup@example.com")).await.unwrap();
    let err = tx
        .insert_user(&new_user("dup@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "EMAIL_USED");
    assert_eq!(err.to_string(), "Email already used: dup@example.com");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_rollback_discards_insert() {
    let db = TestDatabase::new().await;
    let store = MySqlUserStore::new(db.pool());

    let mut tx = store.begin().await.unwrap();
    let saved = tx.insert_user(&new_user("gone@example.com")).await.unwrap();
    tx.rollback().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    assert!(tx.find_user_by_id(saved.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_activate_and_delete() {
    let db = TestDatabase::new().await;
    let store = MySqlUserStore::new(db.pool());

    let mut tx = store.begin().await.unwrap();
    let mut user = tx.insert_user(&new_user("life@example.com")).await.unwrap();

    user.bio = "updated".to_string();
    tx.update_user(&user).await.unwrap();
    tx.activate_user(&user.email).await.unwrap();

    let found = tx.find_user_by_email(&user.email).await.unwrap().unwrap();
    assert_eq!(found.bio, "updated");
    assert!(found.is_active);

    assert!(tx.delete_user(user.id).await.unwrap());
    assert!(!tx.delete_user(user.id).await.unwrap());
    tx.commit().await.unwrap();
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_find_all_ascending() {
    let db = TestDatabase::new().await;
    let store = MySqlUserStore::new(db.pool());

    let mut tx = store.begin().await.unwrap();
    for email in ["c@example.com", "a@example.com", "b@example.com"] {
        tx.insert_user(&new_user(email)).await.unwrap();
    }
    let users = tx.find_all_users().await.unwrap();
    tx.commit().await.unwrap();

    let ids: Vec<_> = users.iter().map(|u| u.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(users.len(), 3);
}
