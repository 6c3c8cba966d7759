//! Shared fakes for the service tests.

use crate::cache::{CacheInterface, InMemoryCache};
use crate::otp::OtpGenerator;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tessera_core::{Email, NewUser, TesseraError, TesseraResult, User, UserId};
use tessera_repository::{InMemoryUserStore, StoreTransaction, UserStore};
use tessera_security::PasswordHasherInterface;

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: Email::new(email).unwrap(),
        bio: String::new(),
        password_hash: "hashed_password".to_string(),
    }
}

/// In-memory cache whose operations can be switched to fail.
#[derive(Debug, Default)]
pub struct FlakyCache {
    inner: InMemoryCache,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
}

impl FlakyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &InMemoryCache {
        &self.inner
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool) -> TesseraResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(TesseraError::cache("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheInterface for FlakyCache {
    async fn get_raw(&self, key: &str) -> TesseraResult<Option<String>> {
        Self::check(&self.fail_reads)?;
        self.inner.get_raw(key).await
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> TesseraResult<()> {
        Self::check(&self.fail_writes)?;
        self.inner.set_raw(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> TesseraResult<bool> {
        Self::check(&self.fail_deletes)?;
        self.inner.delete(key).await
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

/// In-memory store whose commits can be switched to fail. A failed commit
/// discards the transaction, as a connection lost mid-commit would.
#[derive(Debug, Default)]
pub struct FlakyCommitStore {
    inner: InMemoryUserStore,
    fail_commits: Arc<AtomicBool>,
}

impl FlakyCommitStore {
    pub fn new(inner: InMemoryUserStore) -> Self {
        Self {
            inner,
            fail_commits: Arc::default(),
        }
    }

    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStore for FlakyCommitStore {
    async fn begin(&self) -> TesseraResult<Box<dyn StoreTransaction>> {
        Ok(Box::new(FlakyCommitTransaction {
            inner: self.inner.begin().await?,
            fail_commit: Arc::clone(&self.fail_commits),
        }))
    }
}

struct FlakyCommitTransaction {
    inner: Box<dyn StoreTransaction>,
    fail_commit: Arc<AtomicBool>,
}

#[async_trait]
impl StoreTransaction for FlakyCommitTransaction {
    async fn insert_user(&mut self, user: &NewUser) -> TesseraResult<User> {
        self.inner.insert_user(user).await
    }

    async fn update_user(&mut self, user: &User) -> TesseraResult<()> {
        self.inner.update_user(user).await
    }

    async fn delete_user(&mut self, id: UserId) -> TesseraResult<bool> {
        self.inner.delete_user(id).await
    }

    async fn find_user_by_id(&mut self, id: UserId) -> TesseraResult<Option<User>> {
        self.inner.find_user_by_id(id).await
    }

    async fn find_user_by_email(&mut self, email: &Email) -> TesseraResult<Option<User>> {
        self.inner.find_user_by_email(email).await
    }

    async fn find_all_users(&mut self) -> TesseraResult<Vec<User>> {
        self.inner.find_all_users().await
    }

    async fn activate_user(&mut self, email: &Email) -> TesseraResult<()> {
        self.inner.activate_user(email).await
    }

    async fn commit(self: Box<Self>) -> TesseraResult<()> {
        if self.fail_commit.load(Ordering::SeqCst) {
            self.inner.rollback().await?;
            return Err(TesseraError::Database(
                "connection reset during commit".to_string(),
            ));
        }
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> TesseraResult<()> {
        self.inner.rollback().await
    }
}

/// Hands out queued codes, then repeats the last one.
#[derive(Debug)]
pub struct FixedOtpGenerator {
    codes: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl FixedOtpGenerator {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: Mutex::new(codes.into_iter().map(Into::into).collect()),
            last: Mutex::new("000000".to_string()),
        }
    }
}

impl OtpGenerator for FixedOtpGenerator {
    fn generate(&self) -> String {
        let mut last = self.last.lock();
        if let Some(code) = self.codes.lock().pop_front() {
            *last = code;
        }
        last.clone()
    }
}

/// Reversible stand-in for the Argon2 hasher.
#[derive(Debug, Default)]
pub struct PlainHasher;

impl PasswordHasherInterface for PlainHasher {
    fn hash(&self, password: &str) -> TesseraResult<String> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> TesseraResult<bool> {
        Ok(hash.strip_prefix("plain:") == Some(password))
    }
}
