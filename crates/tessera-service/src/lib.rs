//! # Tessera Service
//!
//! Account use cases on top of the user store, plus the layer that keeps
//! the user cache coherent with the store:
//!
//! ```text
//! AccountService                 validation, hashing, commit/rollback,
//!   ↓                            settling pending effects
//! UserRepository                 read-through lookups, write-through updates,
//!   ↓           ↓          ↓     invalidating deletes, OTP lifecycle
//! StoreTransaction  CacheInterface  OtpStore → OtpNotifier
//! ```
//!
//! Components are wired with Shaku; see [`di`].

pub mod account_service;
pub mod cache;
pub mod cached_user_repository;
pub mod di;
pub mod dto;
pub mod guards;
pub mod r#impl;
pub mod notifier;
pub mod otp;

#[cfg(test)]
mod test_support;

pub use account_service::*;
pub use cache::*;
pub use cached_user_repository::{CachedUserRepository, PendingEffects, UserRepository};
pub use di::{build_account_module, build_local_account_module, AccountModule, LocalAccountModule};
pub use dto::*;
pub use notifier::*;
pub use otp::*;
pub use r#impl::AccountServiceImpl;
