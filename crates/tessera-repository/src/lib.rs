//! # Tessera Repository
//!
//! Durable storage for user accounts behind a unit-of-work boundary:
//!
//! ```text
//! Service / coherence layer
//!   ↓  Arc<dyn UserStore>            begin()
//!   ↓  Box<dyn StoreTransaction>     reads + writes, then commit/rollback
//! MySqlUserStore | InMemoryUserStore
//! ```
//!
//! Every read and write goes through a transaction owned by the caller.
//! Dropping a transaction without committing discards its writes.

pub mod memory;
pub mod mysql;
pub mod pool;
pub mod traits;

pub use memory::InMemoryUserStore;
pub use mysql::MySqlUserStore;
pub use pool::*;
pub use traits::*;
