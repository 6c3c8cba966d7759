//! MySQL user store implementation.

use crate::{DatabasePoolInterface, StoreTransaction, UserStore};
use async_trait::async_trait;
use shaku::Component;
use sqlx::{FromRow, MySql, Transaction};
use std::sync::Arc;
use tessera_core::{Email, NewUser, TesseraError, TesseraResult, User, UserId};
use tracing::debug;

const USER_COLUMNS: &str = "id, first_name, last_name, email, bio, password_hash, is_active";

/// MySQL-backed user store.
#[derive(Component, Clone)]
#[shaku(interface = UserStore)]
pub struct MySqlUserStore {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlUserStore {
    /// Creates a new MySQL user store.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for MySqlUserStore {
    async fn begin(&self) -> TesseraResult<Box<dyn StoreTransaction>> {
        let tx = self.pool.inner().begin().await?;
        Ok(Box::new(MySqlStoreTransaction { tx }))
    }
}

/// Database row representation of a user.
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    bio: String,
    password_hash: String,
    is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: Email::new_unchecked(row.email),
            bio: row.bio,
            password_hash: row.password_hash,
            is_active: row.is_active,
        }
    }
}

/// Email is the only unique business column, so a unique violation on a
/// write means the address is taken.
fn map_write_error(err: sqlx::Error, email: &Email) -> TesseraError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            TesseraError::EmailUsed(email.to_string())
        }
        _ => err.into(),
    }
}

/// A MySQL transaction. sqlx rolls it back on drop unless committed.
struct MySqlStoreTransaction {
    tx: Transaction<'static, MySql>,
}

#[async_trait]
impl StoreTransaction for MySqlStoreTransaction {
    async fn insert_user(&mut self, user: &NewUser) -> TesseraResult<User> {
        debug!("Inserting user: {}", user.email);

        let result = sqlx::query(
            r"
            INSERT INTO users (first_name, last_name, email, bio, password_hash, is_active)
            VALUES (?, ?, ?, ?, ?, FALSE)
            ",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.email.as_str())
        .bind(&user.bio)
        .bind(&user.password_hash)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, &user.email))?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|e| TesseraError::Database(format!("Invalid insert id: {e}")))?;

        Ok(user.clone().into_user(UserId::new(id)))
    }

    async fn update_user(&mut self, user: &User) -> TesseraResult<()> {
        debug!("Updating user: {}", user.id);

        sqlx::query(
            r"
            UPDATE users
            SET first_name = ?, last_name = ?, email = ?, bio = ?,
                password_hash = ?, is_active = ?
            WHERE id = ?
            ",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.email.as_str())
        .bind(&user.bio)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.id.into_inner())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_write_error(e, &user.email))?;

        Ok(())
    }

    async fn delete_user(&mut self, id: UserId) -> TesseraResult<bool> {
        debug!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.into_inner())
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_user_by_id(&mut self, id: UserId) -> TesseraResult<Option<User>> {
        debug!("Finding user by id: {}", id);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id.into_inner())
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_user_by_email(&mut self, email: &Email) -> TesseraResult<Option<User>> {
        debug!("Finding user by email: {}", email);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_all_users(&mut self) -> TesseraResult<Vec<User>> {
        debug!("Finding all users");

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"
        ))
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn activate_user(&mut self, email: &Email) -> TesseraResult<()> {
        debug!("Activating user: {}", email);

        sqlx::query("UPDATE users SET is_active = TRUE WHERE email = ?")
            .bind(email.as_str())
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> TesseraResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> TesseraResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
