//! Access control gate: maps a role to the mutations it may perform.
//!
//! Only room creation and renaming are restricted to `Admin`. Stock,
//! temperature and fermentation changes are open to every role.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{StoreroomError, StoreroomResult};
use crate::models::role::Role;

/// A gated mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Action {
    AddRoom,
    RenameRoom,
    UpdateTemperature,
    AdjustStock,
    ToggleFermentation,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::AddRoom,
        Action::RenameRoom,
        Action::UpdateTemperature,
        Action::AdjustStock,
        Action::ToggleFermentation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::AddRoom => "add room",
            Action::RenameRoom => "rename room",
            Action::UpdateTemperature => "update temperature",
            Action::AdjustStock => "adjust stock",
            Action::ToggleFermentation => "toggle fermentation",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_permitted(role: Role, action: Action) -> bool {
    match action {
        Action::AddRoom | Action::RenameRoom => role == Role::Admin,
        Action::UpdateTemperature | Action::AdjustStock | Action::ToggleFermentation => true,
    }
}

/// Like [`is_permitted`], but a denial becomes
/// [`StoreroomError::AuthorizationDenied`].
pub fn authorize(role: Role, action: Action) -> StoreroomResult<()> {
    if is_permitted(role, action) {
        Ok(())
    } else {
        Err(StoreroomError::AuthorizationDenied { role, action })
    }
}

/// Every action `role` may perform.
pub fn permitted_actions(role: Role) -> Vec<Action> {
    Action::ALL
        .into_iter()
        .filter(|action| is_permitted(role, *action))
        .collect()
}
