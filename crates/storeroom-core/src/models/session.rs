//! Session-scoped actor identity.

use serde::{Deserialize, Serialize};

use super::role::Role;

/// The active user's session. Passed explicitly into every mutation
/// and access check; never stored in the remote store.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    role: Role,
}

impl Session {
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Switch the acting role for the rest of this session.
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }
}
