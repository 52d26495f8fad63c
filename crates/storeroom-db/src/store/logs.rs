//! Audit log queries. The log table is append-only: there is no update
//! or delete path.

use chrono::{DateTime, Utc};
use storeroom_core::models::log_entry::{CreateLogEntry, LogAction, LogEntry};
use storeroom_core::models::role::Role;
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::SurrealStore;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct LogRow {
    user_role: String,
    room_name: String,
    action: String,
    details: String,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct LogRowWithId {
    record_id: String,
    user_role: String,
    room_name: String,
    action: String,
    details: String,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn row_to_entry(row: LogRow, id: Uuid) -> Result<LogEntry, DbError> {
    let user_role: Role = row
        .user_role
        .parse()
        .map_err(|_| DbError::Decode(format!("unknown role: {}", row.user_role)))?;
    let action: LogAction = row
        .action
        .parse()
        .map_err(|_| DbError::Decode(format!("unknown log action: {}", row.action)))?;
    Ok(LogEntry {
        id,
        user_role,
        room_name: row.room_name,
        action,
        details: row.details,
        timestamp: row.timestamp,
    })
}

impl LogRowWithId {
    fn try_into_entry(self) -> Result<LogEntry, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid log UUID: {e}")))?;
        row_to_entry(
            LogRow {
                user_role: self.user_role,
                room_name: self.room_name,
                action: self.action,
                details: self.details,
                timestamp: self.timestamp,
            },
            id,
        )
    }
}

impl<C: Connection> SurrealStore<C> {
    pub(crate) async fn append_log(&self, input: CreateLogEntry) -> Result<LogEntry, DbError> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let timestamp = input.timestamp.unwrap_or_else(Utc::now);

        let result = self
            .client()?
            .query(
                "CREATE type::record('room_log', $id) SET \
                 user_role = $user_role, \
                 room_name = $room_name, \
                 action = $action, \
                 details = $details, \
                 timestamp = $timestamp",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_role", input.user_role.as_str().to_string()))
            .bind(("room_name", input.room_name))
            .bind(("action", input.action.as_str().to_string()))
            .bind(("details", input.details))
            .bind(("timestamp", timestamp))
            .await?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<LogRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "room_log".into(),
            id: id_str,
        })?;

        debug!(log_id = %id, action = %input.action, "Audit entry appended");
        row_to_entry(row, id)
    }

    /// Audit entries, newest first, optionally capped at `limit`.
    pub async fn list_logs(&self, limit: Option<usize>) -> Result<Vec<LogEntry>, DbError> {
        let db = self.client()?;
        let mut result = match limit {
            Some(limit) => {
                db.query(
                    "SELECT meta::id(id) AS record_id, * \
                     FROM room_log \
                     ORDER BY timestamp DESC \
                     LIMIT $limit",
                )
                .bind(("limit", limit as u64))
                .await?
            }
            None => {
                db.query(
                    "SELECT meta::id(id) AS record_id, * \
                     FROM room_log \
                     ORDER BY timestamp DESC",
                )
                .await?
            }
        };

        let rows: Vec<LogRowWithId> = result.take(0)?;
        rows.into_iter().map(LogRowWithId::try_into_entry).collect()
    }

    pub async fn count_logs(&self) -> Result<u64, DbError> {
        let mut result = self
            .client()?
            .query("SELECT count() AS total FROM room_log GROUP ALL")
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
