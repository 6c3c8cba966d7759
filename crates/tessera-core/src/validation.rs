//! Validation utilities.

use crate::{FieldError, TesseraError};
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `TesseraError` on failure.
    fn validate_request(&self) -> Result<(), TesseraError> {
        self.validate().map_err(validation_errors_to_tessera_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Converts `validator::ValidationErrors` to `TesseraError::Validation`,
/// keeping one `FieldError` per failed rule.
#[must_use]
pub fn validation_errors_to_tessera_error(errors: ValidationErrors) -> TesseraError {
    let mut details: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string),
                code: error.code.to_string(),
            })
        })
        .collect();
    // HashMap order is not stable
    details.sort_by(|a, b| a.field.cmp(&b.field));

    let message = details
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    TesseraError::Validation { message, details }
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Validates that an OTP code is made of ASCII digits only.
    pub fn numeric_code(value: &str) -> Result<(), ValidationError> {
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::new("numeric_code"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;

    #[derive(Validate)]
    struct SignupForm {
        #[validate(length(min = 1))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_numeric_code() {
        assert!(numeric_code("123456").is_ok());
        assert!(numeric_code("000000").is_ok());
        assert!(numeric_code("12a456").is_err());
        assert!(numeric_code("").is_err());
    }

    #[test]
    fn test_validate_request_collects_field_errors() {
        let form = SignupForm {
            name: String::new(),
            email: "not-an-email".to_string(),
        };

        let err = form.validate_request().unwrap_err();
        assert_eq!(err.status_code(), 400);
        match err {
            TesseraError::Validation { details, .. } => {
                let fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "name"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_request_passes() {
        let form = SignupForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };
        assert!(form.validate_request().is_ok());
    }
}
