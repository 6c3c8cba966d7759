//! Account service implementations.
//!
//! Trait definitions live in the parent module (`account_service.rs`).

pub mod account_service_impl;

pub use account_service_impl::AccountServiceImpl;
