//! Domain models for the storeroom system.
//!
//! These are the core types shared across all crates.

pub mod log_entry;
pub mod role;
pub mod room;
pub mod session;
