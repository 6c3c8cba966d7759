//! In-process user store for local development and tests.

use crate::{StoreTransaction, UserStore};
use async_trait::async_trait;
use shaku::Component;
use std::collections::BTreeMap;
use std::sync::Arc;
use tessera_core::{Email, NewUser, TesseraError, TesseraResult, User, UserId};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Committed rows and the id sequence of an [`InMemoryUserStore`].
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    users: BTreeMap<UserId, User>,
    last_id: i64,
}

/// User store held in memory.
///
/// Transactions are serialized: `begin` waits until the previous
/// transaction has committed or been dropped. Each transaction works on a
/// private copy that replaces the shared state on commit.
#[derive(Component, Debug, Clone, Default)]
#[shaku(interface = UserStore)]
pub struct InMemoryUserStore {
    #[shaku(default)]
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed users, ascending by id.
    pub async fn snapshot(&self) -> Vec<User> {
        self.state.lock().await.users.values().cloned().collect()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn begin(&self) -> TesseraResult<Box<dyn StoreTransaction>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTransaction { guard, working }))
    }
}

struct InMemoryTransaction {
    guard: OwnedMutexGuard<StoreState>,
    working: StoreState,
}

impl InMemoryTransaction {
    fn ensure_email_free(&self, email: &Email, owner: Option<UserId>) -> TesseraResult<()> {
        let taken = self
            .working
            .users
            .values()
            .any(|u| &u.email == email && Some(u.id) != owner);
        if taken {
            return Err(TesseraError::EmailUsed(email.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn insert_user(&mut self, user: &NewUser) -> TesseraResult<User> {
        self.ensure_email_free(&user.email, None)?;

        self.working.last_id += 1;
        let user = user.clone().into_user(UserId::new(self.working.last_id));
        self.working.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&mut self, user: &User) -> TesseraResult<()> {
        self.ensure_email_free(&user.email, Some(user.id))?;

        if let Some(existing) = self.working.users.get_mut(&user.id) {
            *existing = user.clone();
        }
        Ok(())
    }

    async fn delete_user(&mut self, id: UserId) -> TesseraResult<bool> {
        Ok(self.working.users.remove(&id).is_some())
    }

    async fn find_user_by_id(&mut self, id: UserId) -> TesseraResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn find_user_by_email(&mut self, email: &Email) -> TesseraResult<Option<User>> {
        Ok(self
            .working
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn find_all_users(&mut self) -> TesseraResult<Vec<User>> {
        Ok(self.working.users.values().cloned().collect())
    }

    async fn activate_user(&mut self, email: &Email) -> TesseraResult<()> {
        if let Some(user) = self.working.users.values_mut().find(|u| &u.email == email) {
            user.activate();
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> TesseraResult<()> {
        let Self { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> TesseraResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: Email::new(email).unwrap(),
            bio: String::new(),
            password_hash: "hashed_password".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = InMemoryUserStore::new();
        let mut tx = store.begin().await.unwrap();

        let first = tx.insert_user(&new_user("one@example.com")).await.unwrap();
        let second = tx.insert_user(&new_user("two@example.com")).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(first.id, UserId::new(1));
        assert_eq!(second.id, UserId::new(2));
        assert!(!first.is_active);
    }

    #[tokio::test]
    async fn test_commit_makes_writes_visible() {
        let store = InMemoryUserStore::new();
        let mut tx = store.begin().await.unwrap();
        let user = tx.insert_user(&new_user("a@x.com")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let found = tx.find_user_by_id(user.id).await.unwrap();
        assert_eq!(found, Some(user));
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let store = InMemoryUserStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_user(&new_user("a@x.com")).await.unwrap();
        tx.rollback().await.unwrap();

        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = InMemoryUserStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_user(&new_user("a@x.com")).await.unwrap();
        }

        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryUserStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_user(&new_user("a@x.com")).await.unwrap();

        let err = tx.insert_user(&new_user("A@X.COM")).await.unwrap_err();
        assert_eq!(err.error_code(), "EMAIL_USED");
    }

    #[tokio::test]
    async fn test_update_to_taken_email_rejected() {
        let store = InMemoryUserStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_user(&new_user("a@x.com")).await.unwrap();
        let mut second = tx.insert_user(&new_user("b@x.com")).await.unwrap();

        second.email = Email::new("a@x.com").unwrap();
        assert!(tx.update_user(&second).await.is_err());
    }

    #[tokio::test]
    async fn test_find_by_email_and_activate() {
        let store = InMemoryUserStore::new();
        let mut tx = store.begin().await.unwrap();
        let user = tx.insert_user(&new_user("a@x.com")).await.unwrap();

        tx.activate_user(&user.email).await.unwrap();
        let found = tx.find_user_by_email(&user.email).await.unwrap().unwrap();
        assert!(found.is_active);
    }

    #[tokio::test]
    async fn test_delete_reports_missing_rows() {
        let store = InMemoryUserStore::new();
        let mut tx = store.begin().await.unwrap();
        let user = tx.insert_user(&new_user("a@x.com")).await.unwrap();

        assert!(tx.delete_user(user.id).await.unwrap());
        assert!(!tx.delete_user(user.id).await.unwrap());
        assert!(tx.find_user_by_id(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_all_is_ascending() {
        let store = InMemoryUserStore::new();
        let mut tx = store.begin().await.unwrap();
        for email in ["c@x.com", "a@x.com", "b@x.com"] {
            tx.insert_user(&new_user(email)).await.unwrap();
        }

        let ids: Vec<i64> = tx
            .find_all_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id.into_inner())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
