//! Cache key generators for consistent key naming.

use tessera_core::{Email, UserId};

/// Prefix for user cache entries.
const CACHE_PREFIX: &str = "tessera:cache";

/// Prefix for outstanding one-time codes.
const OTP_PREFIX: &str = "tessera:otp";

/// Generate a cache key for a user by ID.
#[must_use]
pub fn user_by_id(id: UserId) -> String {
    format!("{CACHE_PREFIX}:user:id:{id}")
}

/// Generate a cache key for a user by email.
#[must_use]
pub fn user_by_email(email: &Email) -> String {
    format!("{CACHE_PREFIX}:user:email:{email}")
}

/// Both keys under which a user is cached.
#[must_use]
pub fn user_keys(id: UserId, email: &Email) -> [String; 2] {
    [user_by_id(id), user_by_email(email)]
}

/// Generate the key of the outstanding OTP for an email.
#[must_use]
pub fn otp(email: &Email) -> String {
    format!("{OTP_PREFIX}:{email}")
}
