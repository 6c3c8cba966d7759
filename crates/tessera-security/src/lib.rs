//! # Tessera Security
//!
//! One-way password hashing for account credentials.

pub mod password;

pub use password::*;
