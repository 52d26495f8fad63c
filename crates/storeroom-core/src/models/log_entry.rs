//! Audit log domain model.
//!
//! Entries are append-only: once created they are never updated or
//! deleted by this system.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;
use crate::error::StoreroomError;

/// Category label for an audit entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LogAction {
    RoomCreated,
    RoomRenamed,
    TemperatureChanged,
    StockIn,
    StockOut,
    FermentationStarted,
    FermentationStopped,
}

impl LogAction {
    pub const ALL: [LogAction; 7] = [
        LogAction::RoomCreated,
        LogAction::RoomRenamed,
        LogAction::TemperatureChanged,
        LogAction::StockIn,
        LogAction::StockOut,
        LogAction::FermentationStarted,
        LogAction::FermentationStopped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::RoomCreated => "room created",
            LogAction::RoomRenamed => "room renamed",
            LogAction::TemperatureChanged => "temperature changed",
            LogAction::StockIn => "stock in",
            LogAction::StockOut => "stock out",
            LogAction::FermentationStarted => "fermentation started",
            LogAction::FermentationStopped => "fermentation stopped",
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogAction {
    type Err = StoreroomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| StoreroomError::validation(format!("unknown log action: {s}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub user_role: Role,
    /// Room name at the time of the action. Not updated on rename.
    pub room_name: String,
    pub action: LogAction,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLogEntry {
    pub user_role: Role,
    pub room_name: String,
    pub action: LogAction,
    pub details: String,
    /// Assigned by the store when absent.
    pub timestamp: Option<DateTime<Utc>>,
}

impl CreateLogEntry {
    pub fn new(
        user_role: Role,
        room_name: impl Into<String>,
        action: LogAction,
        details: impl Into<String>,
    ) -> Self {
        Self {
            user_role,
            room_name: room_name.into(),
            action,
            details: details.into(),
            timestamp: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_labels_parse_back() {
        for action in LogAction::ALL {
            assert_eq!(action.as_str().parse::<LogAction>().unwrap(), action);
        }
    }

    #[test]
    fn unknown_action_label_is_rejected() {
        assert!("room deleted".parse::<LogAction>().is_err());
    }
}
