//! Email value object.
//!
//! Addresses are trimmed and lowercased on construction, so two spellings
//! of the same mailbox compare equal and derive the same cache key.

use crate::TesseraError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use validator::ValidateEmail;

/// Error type for email validation.
#[derive(Debug, Error)]
#[error("Invalid email address: {0}")]
pub struct EmailError(String);

impl From<EmailError> for TesseraError {
    fn from(err: EmailError) -> Self {
        Self::field_validation("email", "email", err.to_string())
    }
}

/// Normalized email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Creates a new Email after validating the format.
    pub fn new(email: impl Into<String>) -> Result<Self, EmailError> {
        let email = email.into().trim().to_lowercase();

        if !email.validate_email() {
            return Err(EmailError(email));
        }

        Ok(Self(email))
    }

    /// Creates an Email from a trusted source such as a store row.
    /// Normalization still applies.
    #[must_use]
    pub fn new_unchecked(email: impl Into<String>) -> Self {
        Self(email.into().trim().to_lowercase())
    }

    /// Returns the email as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalization() {
        let email = Email::new("  A@X.COM  ").unwrap();
        assert_eq!(email.as_str(), "a@x.com");
    }

    #[test]
    fn test_mixed_case_addresses_are_equal() {
        assert_eq!(
            Email::new("Ada@Example.com").unwrap(),
            Email::new("ada@example.COM").unwrap()
        );
    }

    #[test]
    fn test_invalid_email() {
        assert!(Email::new("invalid").is_err());
        assert!(Email::new("@example.com").is_err());
        assert!(Email::new("test@").is_err());
    }

    #[test]
    fn test_email_error_maps_to_validation() {
        let err: TesseraError = Email::new("bad").unwrap_err().into();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_email_serde() {
        let email = Email::new("user@example.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"user@example.com\"");
        let parsed: Email = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, email);
        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());
    }
}
