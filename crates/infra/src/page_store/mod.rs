//! Page persistence boundary.
//!
//! This module defines the storage abstraction for networks, pages, parts and
//! variables, plus an in-memory implementation (tests/dev) and a Postgres one.

pub mod in_memory;
#[cfg(test)]
pub(crate) mod outage;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryPageStore;
pub use postgres::PostgresPageStore;
pub use r#trait::{PageStore, StoreError};
