//! Schema definitions and migration runner for SurrealDB.
//!
//! Tables use SCHEMAFULL mode. UUIDs are stored as record ids, enums
//! as strings with ASSERT constraints. Inventory is a FLEXIBLE object
//! so new material keys can appear without a schema change.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "rooms_and_audit_log",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Rooms
-- =======================================================================
DEFINE TABLE room SCHEMAFULL;
DEFINE FIELD name ON TABLE room TYPE string;
DEFINE FIELD temperature ON TABLE room TYPE float;
DEFINE FIELD inventory ON TABLE room TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD fermentation_start ON TABLE room TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE room TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE room TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_room_created ON TABLE room COLUMNS created_at;

-- =======================================================================
-- Room audit log
-- =======================================================================
-- Record-level permissions only bind non-root sessions. For the root
-- connection the log stays append-only because the store issues no
-- UPDATE or DELETE against this table.
DEFINE TABLE room_log SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD user_role ON TABLE room_log TYPE string \
    ASSERT $value IN ['Admin', 'Auditor', 'Guest'];
DEFINE FIELD room_name ON TABLE room_log TYPE string;
DEFINE FIELD action ON TABLE room_log TYPE string \
    ASSERT $value IN ['room created', 'room renamed', \
    'temperature changed', 'stock in', 'stock out', \
    'fermentation started', 'fermentation stopped'];
DEFINE FIELD details ON TABLE room_log TYPE string;
DEFINE FIELD timestamp ON TABLE room_log TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_room_log_time ON TABLE room_log COLUMNS timestamp;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
