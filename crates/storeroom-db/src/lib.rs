//! Storeroom Database — SurrealDB implementation of the remote store.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - The [`SurrealStore`] adapter implementing
//!   [`storeroom_core::store::RemoteStore`], with live-query backed
//!   push subscriptions
//! - Error types ([`DbError`])

mod connection;
mod error;
mod schema;
pub mod store;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
pub use store::SurrealStore;
