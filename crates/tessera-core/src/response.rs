//! Uniform response envelope shared by every transport.
//!
//! Hosts serialize [`ApiResponse`] as-is and use `code` as the transport
//! status; the account service never builds transport types itself.

use crate::{ErrorResponse, TesseraError, TesseraResult};
use serde::{Deserialize, Serialize};

/// Status label for successful responses.
pub const STATUS_OK: &str = "OK";

/// Standard response wrapper: `{code, status, data | error}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl<T> ApiResponse<T> {
    /// Creates a successful response.
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            status: STATUS_OK.to_string(),
            data: Some(data),
            error: None,
        }
    }

    /// Creates an error response from a failure.
    #[must_use]
    pub fn from_error(error: &TesseraError) -> Self {
        Self {
            code: error.status_code(),
            status: error.status_label().to_string(),
            data: None,
            error: Some(ErrorResponse::from_error(error)),
        }
    }

    /// Returns `true` for a success envelope.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl<T> From<TesseraResult<T>> for ApiResponse<T> {
    fn from(result: TesseraResult<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::from_error(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let response = ApiResponse::success("hello");
        assert_eq!(response.code, 200);
        assert_eq!(response.status, "OK");
        assert!(response.is_success());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"], "hello");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_envelope() {
        let response: ApiResponse<()> = ApiResponse::from_error(&TesseraError::WrongOtp);
        assert_eq!(response.code, 400);
        assert_eq!(response.status, "BAD REQUEST");
        assert!(!response.is_success());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"]["code"], "WRONG_OTP");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_from_result() {
        let ok: ApiResponse<i32> = Ok(5).into();
        assert_eq!(ok.data, Some(5));

        let err: ApiResponse<i32> = Err(TesseraError::not_found("User", 9)).into();
        assert_eq!(err.code, 404);
        assert_eq!(err.status, "NOT FOUND");
    }
}
