//! Existence and uniqueness checks over lookup results.

use tessera_core::{Email, TesseraError, TesseraResult, User};

/// Fails with `NotFound` unless the lookup produced a persisted user.
pub fn ensure_found(user: Option<User>, key: impl ToString) -> TesseraResult<User> {
    match user {
        Some(user) if !user.id.is_unset() => Ok(user),
        _ => Err(TesseraError::not_found("User", key)),
    }
}

/// Fails with `EmailUsed` if a by-email lookup returned a user holding
/// `candidate`.
pub fn ensure_email_unused(existing: Option<&User>, candidate: &Email) -> TesseraResult<()> {
    match existing {
        Some(user) if &user.email == candidate => {
            Err(TesseraError::EmailUsed(candidate.to_string()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::UserId;

    fn user(id: i64, email: &str) -> User {
        User {
            id: UserId::new(id),
            first_name: "Ada".to_string(),
            last_name: String::new(),
            email: Email::new(email).unwrap(),
            bio: String::new(),
            password_hash: "hash".to_string(),
            is_active: false,
        }
    }

    #[test]
    fn test_ensure_found() {
        assert!(ensure_found(Some(user(1, "a@x.com")), 1).is_ok());

        let err = ensure_found(None, 7).unwrap_err();
        assert_eq!(err.status_code(), 404);

        let err = ensure_found(Some(user(0, "a@x.com")), 0).unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_ensure_email_unused() {
        let email = Email::new("a@x.com").unwrap();
        let existing = user(1, "a@x.com");

        let err = ensure_email_unused(Some(&existing), &email).unwrap_err();
        assert_eq!(err.error_code(), "EMAIL_USED");
        assert!(ensure_email_unused(None, &email).is_ok());

        let other = Email::new("b@x.com").unwrap();
        assert!(ensure_email_unused(Some(&existing), &other).is_ok());
    }
}
