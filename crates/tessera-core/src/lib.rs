//! # Tessera Core
//!
//! Core types, domain model, and error definitions for the Tessera account
//! backend. Every other crate in the workspace builds on these.

pub mod domain;
pub mod error;
pub mod id;
pub mod response;
pub mod result;
pub mod telemetry;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use response::*;
pub use result::*;
pub use validation::*;

// Re-export shaku for dependency injection
pub use shaku::Interface;
