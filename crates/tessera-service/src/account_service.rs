//! Account service trait definition.

use crate::dto::{
    CreateUserRequest, NewOtpRequest, OtpRequest, SessionRequest, UpdateUserRequest, UserResponse,
};
use async_trait::async_trait;
use tessera_core::{Interface, TesseraResult, UserId};

/// Account use cases. Each call runs in its own unit of work: committed
/// when it returns `Ok`, rolled back otherwise.
#[async_trait]
pub trait AccountService: Interface + Send + Sync {
    /// Registers a pending account and sends its activation code.
    async fn create_user(&self, request: CreateUserRequest) -> TesseraResult<UserResponse>;

    /// Replaces a user's profile fields.
    async fn update_user(&self, request: UpdateUserRequest) -> TesseraResult<UserResponse>;

    /// Deletes a user.
    async fn delete_user(&self, id: UserId) -> TesseraResult<()>;

    /// Checks credentials and returns the matching user.
    async fn session(&self, request: SessionRequest) -> TesseraResult<UserResponse>;

    /// Gets a user by ID.
    async fn find_by_id(&self, id: UserId) -> TesseraResult<UserResponse>;

    /// Gets a user by email.
    async fn find_by_email(&self, email: &str) -> TesseraResult<UserResponse>;

    /// Lists all users, ascending by ID.
    async fn find_all(&self) -> TesseraResult<Vec<UserResponse>>;

    /// Activates a pending account with its outstanding code.
    async fn verify_otp(&self, request: OtpRequest) -> TesseraResult<UserResponse>;

    /// Replaces the outstanding code of a pending account and sends it.
    async fn request_new_otp(&self, request: NewOtpRequest) -> TesseraResult<()>;
}
