//! Data Transfer Objects for the account service.

mod user_dto;

pub use user_dto::*;
