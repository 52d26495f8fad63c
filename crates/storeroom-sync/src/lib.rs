//! Storeroom Sync — keeps a local mirror consistent with the remote
//! store and applies role-gated, audited mutations.
//!
//! Both services are generic over [`storeroom_core::store::RemoteStore`]
//! so this layer has no dependency on the database crate.

pub mod config;
pub mod engine;
pub mod mutation;

pub use config::SyncConfig;
pub use engine::SyncEngine;
pub use mutation::MutationService;
