//! Account domain model.

mod email;
mod otp;
mod user;

pub use email::{Email, EmailError};
pub use otp::Otp;
pub use user::{NewUser, User};
