//! Store trait definitions.

use async_trait::async_trait;
use tessera_core::{Email, Interface, NewUser, TesseraResult, User, UserId};

/// Entry point to the user store: hands out request-scoped transactions.
#[async_trait]
pub trait UserStore: Interface + Send + Sync {
    /// Opens a new unit of work.
    async fn begin(&self) -> TesseraResult<Box<dyn StoreTransaction>>;
}

/// A unit of work over the users table.
///
/// Writes become visible to other transactions only after [`commit`].
/// A transaction that is dropped without commit is rolled back.
///
/// [`commit`]: StoreTransaction::commit
#[async_trait]
pub trait StoreTransaction: Send {
    /// Inserts a new, inactive user and returns it with its assigned id.
    ///
    /// Fails with `EmailUsed` when the address is already registered.
    async fn insert_user(&mut self, user: &NewUser) -> TesseraResult<User>;

    /// Writes every column of an existing row.
    async fn update_user(&mut self, user: &User) -> TesseraResult<()>;

    /// Deletes a row. Returns `false` if no row had that id.
    async fn delete_user(&mut self, id: UserId) -> TesseraResult<bool>;

    async fn find_user_by_id(&mut self, id: UserId) -> TesseraResult<Option<User>>;

    async fn find_user_by_email(&mut self, email: &Email) -> TesseraResult<Option<User>>;

    /// All users, ascending by id.
    async fn find_all_users(&mut self) -> TesseraResult<Vec<User>>;

    /// Sets the active flag of the user registered under `email`.
    async fn activate_user(&mut self, email: &Email) -> TesseraResult<()>;

    async fn commit(self: Box<Self>) -> TesseraResult<()>;

    async fn rollback(self: Box<Self>) -> TesseraResult<()>;
}
