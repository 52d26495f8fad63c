//! Error types for the storeroom system.

use thiserror::Error;

use crate::access::Action;
use crate::models::role::Role;

#[derive(Debug, Error)]
pub enum StoreroomError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Authorization denied: role {role} may not perform '{action}'")]
    AuthorizationDenied { role: Role, action: Action },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Remote store is not configured: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Subscription error: {0}")]
    Subscription(String),

    /// The state write was committed but its audit entry could not be
    /// appended.
    #[error("Audit append failed after committed write: {0}")]
    AuditAppend(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreroomError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn room_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "room".into(),
            id: id.to_string(),
        }
    }
}

pub type StoreroomResult<T> = Result<T, StoreroomError>;
