//! Storeroom Core — domain model, access control, derived views and the
//! remote store capability shared by every other crate.
//!
//! This crate has no database dependency. The synchronization and
//! mutation layers are written against [`store::RemoteStore`] and the
//! SurrealDB adapter lives in `storeroom-db`.

pub mod access;
pub mod error;
pub mod mirror;
pub mod models;
pub mod seed;
pub mod store;
pub mod views;

pub use error::{StoreroomError, StoreroomResult};
pub use mirror::Mirror;
