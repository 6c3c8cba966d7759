//! User entity.

use super::Email;
use crate::UserId;
use serde::{Deserialize, Serialize};

/// A registered account.
///
/// The serialized form carries every field, including the password hash,
/// because it is also the cached copy of the store row and must round-trip
/// exactly. Transport layers expose a projection instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    /// Unique, normalized address.
    pub email: Email,
    pub bio: String,
    /// Opaque one-way hash.
    pub password_hash: String,
    /// False until the OTP sent at registration is verified.
    pub is_active: bool,
}

impl User {
    /// Returns the user's full name.
    #[must_use]
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, _) => self.last_name.clone(),
        }
    }

    /// Marks the account as verified.
    pub fn activate(&mut self) {
        self.is_active = true;
    }
}

/// A user that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub bio: String,
    pub password_hash: String,
}

impl NewUser {
    /// Builds the persisted user once the store has assigned an id.
    /// New accounts always start inactive.
    #[must_use]
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            bio: self.bio,
            password_hash: self.password_hash,
            is_active: false,
        }
    }
}
