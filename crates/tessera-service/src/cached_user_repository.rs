//! Coherence layer between the user store and the user cache.
//!
//! Reads go to the cache first and fall back to the store, populating the
//! cache with what they find. Writes go to the store inside the caller's
//! transaction and evict the affected cache keys. Anything that must only
//! happen once the transaction is durable (refreshing the cache, mailing a
//! code, dropping a consumed code) is returned as [`PendingEffects`] and
//! settled by the caller after commit or rollback.
//!
//! The store stays authoritative: cache failures after a successful store
//! write only cost a later cache miss. The one exception is delete, where a
//! failed eviction aborts so a removed user cannot keep resolving from the
//! cache.

use crate::cache::{cache_keys, CacheExt, CacheInterface};
use crate::guards::ensure_found;
use crate::notifier::{dispatch_otp, OtpNotifier};
use crate::otp::OtpStore;
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use std::time::Duration;
use tessera_core::{Email, Interface, NewUser, Otp, TesseraError, TesseraResult, User, UserId};
use tessera_repository::StoreTransaction;
use tracing::{debug, error, info, warn};

/// Follow-up work of a write that depends on how its transaction ends.
///
/// Hand it to [`UserRepository::after_commit`] once the commit succeeded,
/// or to [`UserRepository::after_rollback`] otherwise.
#[derive(Debug, Default)]
#[must_use = "pending effects must be settled once the transaction has ended"]
pub struct PendingEffects {
    // after commit
    evict: Vec<String>,
    refresh: Option<User>,
    consume_otp: Option<Email>,
    notify: Option<Otp>,
    // after rollback
    restore_otp: Option<Otp>,
    revoke_otp: Option<Email>,
}

impl PendingEffects {
    /// Nothing to do either way.
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns `true` if neither outcome has work attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.evict.is_empty()
            && self.refresh.is_none()
            && self.consume_otp.is_none()
            && self.notify.is_none()
            && self.restore_otp.is_none()
            && self.revoke_otp.is_none()
    }
}

/// Read-through, write-through access to users and their one-time codes.
///
/// Every store access runs on the caller's transaction. Writes return the
/// [`PendingEffects`] the caller settles once that transaction has ended.
#[async_trait]
pub trait UserRepository: Interface + Send + Sync {
    /// Looks a user up by id. Returns `None` if no such row exists; absent
    /// rows are never cached.
    async fn find_by_id(
        &self,
        tx: &mut dyn StoreTransaction,
        id: UserId,
    ) -> TesseraResult<Option<User>>;

    /// Looks a user up by normalized email. Same contract as `find_by_id`.
    async fn find_by_email(
        &self,
        tx: &mut dyn StoreTransaction,
        email: &Email,
    ) -> TesseraResult<Option<User>>;

    /// Every user, ascending by id, straight from the store.
    async fn find_all(&self, tx: &mut dyn StoreTransaction) -> TesseraResult<Vec<User>>;

    /// Inserts a pending user and stores its first code.
    ///
    /// A failure to store the code is returned so the caller rolls the
    /// insert back. The code is mailed after commit and withdrawn after
    /// rollback.
    async fn save(
        &self,
        tx: &mut dyn StoreTransaction,
        user: &NewUser,
        code: String,
    ) -> TesseraResult<(User, PendingEffects)>;

    /// Writes every column of `user`. Both cache keys are refreshed after
    /// commit; the key of a previous address is evicted.
    async fn update(
        &self,
        tx: &mut dyn StoreTransaction,
        user: &User,
    ) -> TesseraResult<(User, PendingEffects)>;

    /// Deletes the row and evicts both cache keys.
    ///
    /// Nothing is evicted if the store delete fails or finds no row. An
    /// eviction failure is returned as a `Cache` error. A pending user's
    /// code is dropped after commit.
    async fn delete(
        &self,
        tx: &mut dyn StoreTransaction,
        user: &User,
    ) -> TesseraResult<PendingEffects>;

    /// The outstanding code for `email`, if any.
    async fn lookup_otp(&self, email: &Email) -> TesseraResult<Option<Otp>>;

    /// Verifies `submitted` against the outstanding code and, on a match,
    /// activates the account and consumes the code.
    ///
    /// No outstanding code is `NotFound`; a different code is `WrongOtp`
    /// and changes nothing. The consumed code comes back after rollback.
    async fn find_otp(
        &self,
        tx: &mut dyn StoreTransaction,
        email: &Email,
        submitted: &str,
    ) -> TesseraResult<(User, PendingEffects)>;

    /// Sets the active flag in the store. The cached copy is refreshed
    /// after commit.
    async fn activate(
        &self,
        tx: &mut dyn StoreTransaction,
        email: &Email,
    ) -> TesseraResult<(User, PendingEffects)>;

    /// Removes the outstanding code for `email`.
    async fn delete_otp(&self, email: &Email) -> TesseraResult<()>;

    /// Stores `code` as the outstanding code for `email`, replacing any
    /// previous one. The code is mailed after commit.
    async fn issue_otp(&self, email: &Email, code: String) -> TesseraResult<PendingEffects>;

    /// Runs the work of a committed write. Failures are logged, never
    /// returned: the store already holds the outcome.
    async fn after_commit(&self, effects: PendingEffects);

    /// Undoes what a rolled-back write did outside the store.
    async fn after_rollback(&self, effects: PendingEffects);
}

/// [`UserRepository`] over a shared cache, OTP store and notifier.
#[derive(Component)]
#[shaku(interface = UserRepository)]
pub struct CachedUserRepository {
    #[shaku(inject)]
    cache: Arc<dyn CacheInterface>,
    #[shaku(inject)]
    otp_store: Arc<dyn OtpStore>,
    #[shaku(inject)]
    notifier: Arc<dyn OtpNotifier>,
    /// Expiry of cached users. `None` keeps them until overwritten or evicted.
    #[shaku(default)]
    user_ttl: Option<Duration>,
}

impl CachedUserRepository {
    #[must_use]
    pub fn new(
        cache: Arc<dyn CacheInterface>,
        otp_store: Arc<dyn OtpStore>,
        notifier: Arc<dyn OtpNotifier>,
        user_ttl: Option<Duration>,
    ) -> Self {
        Self {
            cache,
            otp_store,
            notifier,
            user_ttl,
        }
    }

    async fn activate_row(tx: &mut dyn StoreTransaction, email: &Email) -> TesseraResult<User> {
        tx.activate_user(email).await?;
        ensure_found(tx.find_user_by_email(email).await?, email)
    }

    async fn store_otp(&self, email: &Email, code: String) -> TesseraResult<Otp> {
        let otp = Otp::new(email.clone(), code);
        self.otp_store.set(&otp).await?;
        Ok(otp)
    }

    // ============ Cache helpers ============

    /// A cached user, or `None` on a miss. Unreachable caches and entries
    /// that no longer decode count as misses.
    async fn cached_user(&self, key: &str) -> Option<User> {
        match self.cache.get::<User>(key).await {
            Ok(Some(user)) => {
                debug!("User cache hit: {}", key);
                Some(user)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "Treating unreadable cache entry as a miss");
                None
            }
        }
    }

    /// Overwrites both keys with `user`. A key that cannot be refreshed is
    /// evicted instead, so the two keys never disagree.
    async fn write_through(&self, user: &User) {
        for key in cache_keys::user_keys(user.id, &user.email) {
            if let Err(e) = self.cache.set(&key, user, self.user_ttl).await {
                warn!(key = %key, error = %e, "Failed to refresh cached user");
                self.evict(&key).await;
            }
        }
    }

    async fn evict(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            warn!(key = %key, error = %e, "Failed to evict cached user");
        }
    }

    async fn evict_user(&self, id: UserId, email: &Email) {
        for key in cache_keys::user_keys(id, email) {
            self.evict(&key).await;
        }
    }
}

#[async_trait]
impl UserRepository for CachedUserRepository {
    // ============ Read-through lookups ============

    async fn find_by_id(
        &self,
        tx: &mut dyn StoreTransaction,
        id: UserId,
    ) -> TesseraResult<Option<User>> {
        if let Some(user) = self.cached_user(&cache_keys::user_by_id(id)).await {
            return Ok(Some(user));
        }

        let user = tx.find_user_by_id(id).await?;
        if let Some(user) = &user {
            self.write_through(user).await;
        }
        Ok(user)
    }

    async fn find_by_email(
        &self,
        tx: &mut dyn StoreTransaction,
        email: &Email,
    ) -> TesseraResult<Option<User>> {
        if let Some(user) = self.cached_user(&cache_keys::user_by_email(email)).await {
            return Ok(Some(user));
        }

        let user = tx.find_user_by_email(email).await?;
        if let Some(user) = &user {
            self.write_through(user).await;
        }
        Ok(user)
    }

    async fn find_all(&self, tx: &mut dyn StoreTransaction) -> TesseraResult<Vec<User>> {
        tx.find_all_users().await
    }

    // ============ Writes ============

    async fn save(
        &self,
        tx: &mut dyn StoreTransaction,
        user: &NewUser,
        code: String,
    ) -> TesseraResult<(User, PendingEffects)> {
        let saved = tx.insert_user(user).await?;
        let otp = self.store_otp(&saved.email, code).await?;

        info!("User staged: {}", saved.id);
        let effects = PendingEffects {
            notify: Some(otp),
            revoke_otp: Some(saved.email.clone()),
            ..PendingEffects::default()
        };
        Ok((saved, effects))
    }

    async fn update(
        &self,
        tx: &mut dyn StoreTransaction,
        user: &User,
    ) -> TesseraResult<(User, PendingEffects)> {
        let previous = ensure_found(tx.find_user_by_id(user.id).await?, user.id)?;

        tx.update_user(user).await?;
        // Uncommitted columns never reach the cache.
        self.evict_user(previous.id, &previous.email).await;

        let mut effects = PendingEffects {
            refresh: Some(user.clone()),
            ..PendingEffects::default()
        };
        if previous.email != user.email {
            effects.evict.push(cache_keys::user_by_email(&previous.email));
        }

        info!("User update staged: {}", user.id);
        Ok((user.clone(), effects))
    }

    async fn delete(
        &self,
        tx: &mut dyn StoreTransaction,
        user: &User,
    ) -> TesseraResult<PendingEffects> {
        if !tx.delete_user(user.id).await? {
            return Err(TesseraError::not_found("User", user.id));
        }

        let [by_id, by_email] = cache_keys::user_keys(user.id, &user.email);
        let evicted_id = self.cache.delete(&by_id).await;
        let evicted_email = self.cache.delete(&by_email).await;
        evicted_id.map_err(|e| TesseraError::cache(format!("Failed to evict {by_id}: {e}")))?;
        evicted_email
            .map_err(|e| TesseraError::cache(format!("Failed to evict {by_email}: {e}")))?;

        info!("User delete staged: {}", user.id);
        // A read racing the commit may have cached the row again.
        Ok(PendingEffects {
            evict: vec![by_id, by_email],
            consume_otp: (!user.is_active).then(|| user.email.clone()),
            ..PendingEffects::default()
        })
    }

    // ============ OTP lifecycle ============

    async fn lookup_otp(&self, email: &Email) -> TesseraResult<Option<Otp>> {
        self.otp_store.get(email).await
    }

    async fn find_otp(
        &self,
        tx: &mut dyn StoreTransaction,
        email: &Email,
        submitted: &str,
    ) -> TesseraResult<(User, PendingEffects)> {
        let otp = self
            .lookup_otp(email)
            .await?
            .ok_or_else(|| TesseraError::not_found("Otp", email))?;

        if !otp.matches(submitted) {
            debug!("OTP mismatch for {}", email);
            return Err(TesseraError::WrongOtp);
        }

        let user = Self::activate_row(tx, &otp.email).await?;
        self.evict_user(user.id, &user.email).await;
        self.delete_otp(&otp.email).await?;

        info!("User activation staged: {}", user.id);
        let effects = PendingEffects {
            refresh: Some(user.clone()),
            restore_otp: Some(otp),
            ..PendingEffects::default()
        };
        Ok((user, effects))
    }

    async fn activate(
        &self,
        tx: &mut dyn StoreTransaction,
        email: &Email,
    ) -> TesseraResult<(User, PendingEffects)> {
        let user = Self::activate_row(tx, email).await?;
        self.evict_user(user.id, &user.email).await;

        let effects = PendingEffects {
            refresh: Some(user.clone()),
            ..PendingEffects::default()
        };
        Ok((user, effects))
    }

    async fn delete_otp(&self, email: &Email) -> TesseraResult<()> {
        self.otp_store.delete(email).await?;
        Ok(())
    }

    async fn issue_otp(&self, email: &Email, code: String) -> TesseraResult<PendingEffects> {
        let otp = self.store_otp(email, code).await?;
        Ok(PendingEffects {
            notify: Some(otp),
            ..PendingEffects::default()
        })
    }

    // ============ Settlement ============

    async fn after_commit(&self, effects: PendingEffects) {
        for key in &effects.evict {
            self.evict(key).await;
        }
        if let Some(user) = &effects.refresh {
            self.write_through(user).await;
        }
        if let Some(email) = &effects.consume_otp {
            if let Err(e) = self.otp_store.delete(email).await {
                warn!(email = %email, error = %e, "Failed to drop code of deleted user");
            }
        }
        if let Some(otp) = effects.notify {
            dispatch_otp(Arc::clone(&self.notifier), otp);
        }
    }

    async fn after_rollback(&self, effects: PendingEffects) {
        if let Some(otp) = &effects.restore_otp {
            if let Err(e) = self.otp_store.set(otp).await {
                error!(email = %otp.email, error = %e, "Failed to restore consumed code");
            }
        }
        if let Some(email) = &effects.revoke_otp {
            if let Err(e) = self.otp_store.delete(email).await {
                warn!(email = %email, error = %e, "Failed to withdraw code of rolled back user");
            }
        }
    }
}

impl std::fmt::Debug for CachedUserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedUserRepository")
            .field("user_ttl", &self.user_ttl)
            .finish_non_exhaustive()
    }
}
