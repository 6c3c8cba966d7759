//! One-time verification code.

use super::Email;
use serde::{Deserialize, Serialize};

/// An outstanding verification code for a pending account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Otp {
    pub email: Email,
    pub code: String,
}

impl Otp {
    #[must_use]
    pub fn new(email: Email, code: impl Into<String>) -> Self {
        Self {
            email,
            code: code.into(),
        }
    }

    /// Compares a submitted code without short-circuiting on the first
    /// differing byte.
    #[must_use]
    pub fn matches(&self, submitted: &str) -> bool {
        let expected = self.code.as_bytes();
        let submitted = submitted.as_bytes();
        if expected.len() != submitted.len() {
            return false;
        }
        expected
            .iter()
            .zip(submitted)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches() {
        let otp = Otp::new(Email::new("a@x.com").unwrap(), "123456");
        assert!(otp.matches("123456"));
        assert!(!otp.matches("000000"));
        assert!(!otp.matches("12345"));
        assert!(!otp.matches(""));
    }
}
