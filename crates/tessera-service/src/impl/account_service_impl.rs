//! Account service implementation.

use crate::account_service::AccountService;
use crate::cached_user_repository::{PendingEffects, UserRepository};
use crate::dto::{
    CreateUserRequest, NewOtpRequest, OtpRequest, SessionRequest, UpdateUserRequest, UserResponse,
};
use crate::guards::{ensure_email_unused, ensure_found};
use crate::otp::OtpGenerator;
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use tessera_core::{Email, NewUser, TesseraError, TesseraResult, User, UserId, ValidateExt};
use tessera_repository::{StoreTransaction, UserStore};
use tessera_security::PasswordHasherInterface;
use tracing::{debug, error, info};

/// Account service over a transactional store and the cached repository.
///
/// Every public call opens one transaction, runs its steps against it and
/// commits only if all of them succeed. Cache refreshes and code delivery
/// wait for the commit; a failed commit undoes the code changes instead.
#[derive(Component)]
#[shaku(interface = AccountService)]
pub struct AccountServiceImpl {
    #[shaku(inject)]
    store: Arc<dyn UserStore>,
    #[shaku(inject)]
    users: Arc<dyn UserRepository>,
    #[shaku(inject)]
    password_hasher: Arc<dyn PasswordHasherInterface>,
    #[shaku(inject)]
    otp_generator: Arc<dyn OtpGenerator>,
}

impl AccountServiceImpl {
    /// Creates a new account service.
    pub fn new(
        store: Arc<dyn UserStore>,
        users: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasherInterface>,
        otp_generator: Arc<dyn OtpGenerator>,
    ) -> Self {
        Self {
            store,
            users,
            password_hasher,
            otp_generator,
        }
    }

    async fn create_user_in(
        &self,
        tx: &mut dyn StoreTransaction,
        request: CreateUserRequest,
    ) -> TesseraResult<(User, PendingEffects)> {
        let email = Email::new(&request.email)?;
        let existing = self.users.find_by_email(tx, &email).await?;
        ensure_email_unused(existing.as_ref(), &email)?;

        let password_hash = self.password_hasher.hash(&request.password)?;
        let user = NewUser {
            first_name: request.first_name,
            last_name: request.last_name,
            email,
            bio: request.bio,
            password_hash,
        };

        self.users
            .save(tx, &user, self.otp_generator.generate())
            .await
    }

    async fn update_user_in(
        &self,
        tx: &mut dyn StoreTransaction,
        request: UpdateUserRequest,
    ) -> TesseraResult<(User, PendingEffects)> {
        let mut user = ensure_found(self.users.find_by_id(tx, request.id).await?, request.id)?;

        let email = Email::new(&request.email)?;
        if email != user.email {
            let holder = self.users.find_by_email(tx, &email).await?;
            ensure_email_unused(holder.as_ref(), &email)?;
        }

        user.first_name = request.first_name;
        user.last_name = request.last_name;
        user.email = email;
        user.bio = request.bio;

        self.users.update(tx, &user).await
    }

    async fn delete_user_in(
        &self,
        tx: &mut dyn StoreTransaction,
        id: UserId,
    ) -> TesseraResult<((), PendingEffects)> {
        let user = ensure_found(self.users.find_by_id(tx, id).await?, id)?;
        let effects = self.users.delete(tx, &user).await?;
        Ok(((), effects))
    }

    async fn session_in(
        &self,
        tx: &mut dyn StoreTransaction,
        request: SessionRequest,
    ) -> TesseraResult<User> {
        let email = Email::new(&request.email)?;
        let user = ensure_found(self.users.find_by_email(tx, &email).await?, &email)?;

        if !self
            .password_hasher
            .verify(&request.password, &user.password_hash)?
        {
            return Err(TesseraError::WrongPassword);
        }

        Ok(user)
    }

    async fn request_new_otp_in(
        &self,
        tx: &mut dyn StoreTransaction,
        email: &Email,
    ) -> TesseraResult<((), PendingEffects)> {
        let user = ensure_found(self.users.find_by_email(tx, email).await?, email)?;

        if user.is_active {
            return Err(TesseraError::field_validation(
                "email",
                "already_active",
                "Account is already active",
            ));
        }

        let effects = self
            .users
            .issue_otp(&user.email, self.otp_generator.generate())
            .await?;
        Ok(((), effects))
    }

    /// Commits a write and settles its pending effects against the outcome.
    ///
    /// A step that failed leaves nothing staged outside the store, so the
    /// error path only rolls back. A failed commit is returned after the
    /// staged code changes have been undone.
    async fn complete<T: Send>(
        &self,
        tx: Box<dyn StoreTransaction>,
        staged: TesseraResult<(T, PendingEffects)>,
    ) -> TesseraResult<T> {
        let (value, effects) = match staged {
            Ok(staged) => staged,
            Err(err) => return Err(rollback(tx, err).await),
        };

        match tx.commit().await {
            Ok(()) => {
                self.users.after_commit(effects).await;
                Ok(value)
            }
            Err(err) => {
                error!(error = %err, "Commit failed, undoing staged effects");
                self.users.after_rollback(effects).await;
                Err(err)
            }
        }
    }
}

/// Commits a read on success. On failure the transaction is rolled back
/// and the original error is returned.
async fn finish<T>(tx: Box<dyn StoreTransaction>, result: TesseraResult<T>) -> TesseraResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => Err(rollback(tx, err).await),
    }
}

/// Rolls `tx` back and hands `err` through; a failed rollback is only logged.
async fn rollback(tx: Box<dyn StoreTransaction>, err: TesseraError) -> TesseraError {
    if let Err(rollback_err) = tx.rollback().await {
        error!(error = %rollback_err, "Failed to roll back transaction");
    }
    err
}

#[async_trait]
impl AccountService for AccountServiceImpl {
    async fn create_user(&self, request: CreateUserRequest) -> TesseraResult<UserResponse> {
        debug!("Creating user: {}", request.email);

        request.validate_request()?;

        let mut tx = self.store.begin().await?;
        let staged = self.create_user_in(tx.as_mut(), request).await;
        let user = self.complete(tx, staged).await?;

        info!("User created: {}", user.id);
        Ok(UserResponse::from(user))
    }

    async fn update_user(&self, request: UpdateUserRequest) -> TesseraResult<UserResponse> {
        debug!("Updating user: {}", request.id);

        request.validate_request()?;

        let mut tx = self.store.begin().await?;
        let staged = self.update_user_in(tx.as_mut(), request).await;
        let user = self.complete(tx, staged).await?;

        info!("User updated: {}", user.id);
        Ok(UserResponse::from(user))
    }

    async fn delete_user(&self, id: UserId) -> TesseraResult<()> {
        debug!("Deleting user: {}", id);

        let mut tx = self.store.begin().await?;
        let staged = self.delete_user_in(tx.as_mut(), id).await;
        self.complete(tx, staged).await?;

        info!("User deleted: {}", id);
        Ok(())
    }

    async fn session(&self, request: SessionRequest) -> TesseraResult<UserResponse> {
        debug!("Opening session for: {}", request.email);

        request.validate_request()?;

        let mut tx = self.store.begin().await?;
        let result = self.session_in(tx.as_mut(), request).await;
        let user = finish(tx, result).await?;

        info!("Session opened: {}", user.id);
        Ok(UserResponse::from(user))
    }

    async fn find_by_id(&self, id: UserId) -> TesseraResult<UserResponse> {
        debug!("Getting user: {}", id);

        let mut tx = self.store.begin().await?;
        let result = self
            .users
            .find_by_id(tx.as_mut(), id)
            .await
            .and_then(|user| ensure_found(user, id));
        finish(tx, result).await.map(UserResponse::from)
    }

    async fn find_by_email(&self, email: &str) -> TesseraResult<UserResponse> {
        debug!("Getting user by email: {}", email);

        let email = Email::new(email)?;

        let mut tx = self.store.begin().await?;
        let result = self
            .users
            .find_by_email(tx.as_mut(), &email)
            .await
            .and_then(|user| ensure_found(user, &email));
        finish(tx, result).await.map(UserResponse::from)
    }

    async fn find_all(&self) -> TesseraResult<Vec<UserResponse>> {
        debug!("Listing users");

        let mut tx = self.store.begin().await?;
        let result = self.users.find_all(tx.as_mut()).await;
        let users = finish(tx, result).await?;

        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    async fn verify_otp(&self, request: OtpRequest) -> TesseraResult<UserResponse> {
        debug!("Verifying OTP for: {}", request.email);

        request.validate_request()?;
        let email = Email::new(&request.email)?;

        let mut tx = self.store.begin().await?;
        let staged = self.users.find_otp(tx.as_mut(), &email, &request.otp).await;
        let user = self.complete(tx, staged).await?;

        info!("User activated: {}", user.id);
        Ok(UserResponse::from(user))
    }

    async fn request_new_otp(&self, request: NewOtpRequest) -> TesseraResult<()> {
        debug!("Issuing new OTP for: {}", request.email);

        request.validate_request()?;
        let email = Email::new(&request.email)?;

        let mut tx = self.store.begin().await?;
        let staged = self.request_new_otp_in(tx.as_mut(), &email).await;
        self.complete(tx, staged).await
    }
}

impl std::fmt::Debug for AccountServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountServiceImpl").finish_non_exhaustive()
    }
}
