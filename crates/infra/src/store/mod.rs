//! Entity store boundary for the resource aggregate.
//!
//! The trait makes no storage assumptions; the in-memory implementation backs
//! tests and local runs, the Postgres one backs deployments.

#[cfg(test)]
pub(crate) mod contract;
pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryResourceStore;
pub use postgres::PostgresResourceStore;
pub use r#trait::{ResourceStore, StoreError};
