//! Unified error taxonomy for every layer of the account backend.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for Tessera.
///
/// The account-facing variants (`NotFound`, `Validation`, `EmailUsed`,
/// `WrongOtp`, `WrongPassword`) map to client errors; everything else is
/// internal and maps to a server error at the boundary.
#[derive(Error, Debug)]
pub enum TesseraError {
    // ============ Account Errors ============
    /// Lookup yielded no row or no outstanding OTP
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Input shape or constraint violation
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },

    /// Email address already registered
    #[error("Email already used: {0}")]
    EmailUsed(String),

    /// OTP present but the submitted code does not match
    #[error("Wrong OTP")]
    WrongOtp,

    /// Credential check failed
    #[error("Wrong password")]
    WrongPassword,

    // ============ Infrastructure Errors ============
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Redis/Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// External service error
    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TesseraError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation { .. } | Self::EmailUsed(_) | Self::WrongOtp | Self::WrongPassword => {
                400
            }
            Self::Database(_)
            | Self::Cache(_)
            | Self::Configuration(_)
            | Self::ExternalService { .. }
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns the human-readable status label paired with [`Self::status_code`].
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        match self.status_code() {
            404 => "NOT FOUND",
            400 => "BAD REQUEST",
            _ => "INTERNAL SERVER ERROR",
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::EmailUsed(_) => "EMAIL_USED",
            Self::WrongOtp => "WRONG_OTP",
            Self::WrongPassword => "WRONG_PASSWORD",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this error is a server-side failure whose message must not
    /// reach clients.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error without field details.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Creates a validation error for a single field.
    #[must_use]
    pub fn field_validation(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let error = FieldError {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        };
        Self::Validation {
            message: format!("{}: {}", error.field, error.message),
            details: vec![error],
        }
    }

    /// Creates a cache error.
    #[must_use]
    pub fn cache<T: Into<String>>(message: T) -> Self {
        Self::Cache(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for TesseraError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            // Unique violations surface as EmailUsed only where the store
            // knows the candidate address.
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for TesseraError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {err}"))
    }
}

/// Serializable error payload carried inside the response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional field-level errors for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Field-level validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `TesseraError`.
    ///
    /// Server-side failures are reported with a generic message.
    #[must_use]
    pub fn from_error(error: &TesseraError) -> Self {
        let message = if error.is_internal() {
            "An internal error occurred".to_string()
        } else {
            error.to_string()
        };

        let details = match error {
            TesseraError::Validation { details, .. } if !details.is_empty() => {
                Some(details.clone())
            }
            _ => None,
        };

        Self {
            code: error.error_code().to_string(),
            message,
            details,
        }
    }
}

impl From<&TesseraError> for ErrorResponse {
    fn from(error: &TesseraError) -> Self {
        Self::from_error(error)
    }
}
