//! Synchronization configuration.

/// Configuration for the synchronization engine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Seed the fixed room catalog on activation when the store holds
    /// no rooms (default: true).
    pub seed_if_empty: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            seed_if_empty: true,
        }
    }
}
