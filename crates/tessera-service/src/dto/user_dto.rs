//! Account-related DTOs.

use serde::{Deserialize, Serialize};
use tessera_core::validation::rules::numeric_code;
use tessera_core::{User, UserId};
use validator::Validate;

/// Registration request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(max = 100))]
    #[serde(default)]
    pub last_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(max = 500, message = "Bio cannot exceed 500 characters"))]
    #[serde(default)]
    pub bio: String,
}

/// Profile update. Every column is replaced; the password and the active
/// flag are not editable here.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    pub id: UserId,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(max = 100))]
    #[serde(default)]
    pub last_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(max = 500, message = "Bio cannot exceed 500 characters"))]
    #[serde(default)]
    pub bio: String,
}

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Submission of the code sent at registration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OtpRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(
        length(min = 4, max = 10, message = "Code must be 4-10 digits"),
        custom(function = "numeric_code", message = "Code must be numeric")
    )]
    pub otp: String,
}

/// Request for a replacement code.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewOtpRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub bio: String,
    pub is_active: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email.to_string(),
            bio: user.bio,
            is_active: user.is_active,
        }
    }
}
