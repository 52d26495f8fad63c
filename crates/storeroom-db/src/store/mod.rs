//! SurrealDB implementation of [`RemoteStore`].

mod live;
mod logs;
mod rooms;

use storeroom_core::error::StoreroomResult;
use storeroom_core::models::log_entry::{CreateLogEntry, LogEntry};
use storeroom_core::models::room::{CreateRoom, Room, UpdateRoom};
use storeroom_core::seed::SEED_ROOMS;
use storeroom_core::store::{RemoteStore, Subscription};
use surrealdb::engine::remote::ws::Client;
use surrealdb::{Connection, Surreal};
use tracing::{info, warn};
use uuid::Uuid;

use crate::connection::{DbConfig, DbManager};
use crate::error::DbError;
use crate::schema::run_migrations;

const ROOM_TABLE: &str = "room";
const LOG_TABLE: &str = "room_log";

/// Remote store backed by a SurrealDB connection.
///
/// A store built with [`SurrealStore::unconfigured`] holds no
/// connection: it reports `is_configured() == false` and every
/// operation fails with a configuration error.
pub struct SurrealStore<C: Connection> {
    db: Option<Surreal<C>>,
    log_limit: Option<usize>,
}

impl<C: Connection> Clone for SurrealStore<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            log_limit: self.log_limit,
        }
    }
}

impl<C: Connection> SurrealStore<C> {
    /// Wrap an already connected client. The schema must be migrated.
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db: Some(db),
            log_limit: None,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            db: None,
            log_limit: None,
        }
    }

    /// Keep only the newest `limit` audit entries in log snapshots.
    pub fn with_log_limit(mut self, limit: Option<usize>) -> Self {
        self.log_limit = limit;
        self
    }

    pub fn log_limit(&self) -> Option<usize> {
        self.log_limit
    }

    fn client(&self) -> Result<&Surreal<C>, DbError> {
        self.db.as_ref().ok_or(DbError::NotConfigured)
    }
}

impl SurrealStore<Client> {
    /// Connect and migrate using `config`.
    ///
    /// An unconfigured `config` yields an unconfigured store without
    /// attempting any connection.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        if !config.is_configured() {
            warn!("Remote store is not configured; synchronization is unavailable");
            return Ok(Self::unconfigured());
        }

        let manager = DbManager::connect(config).await?;
        run_migrations(manager.client()).await?;
        Ok(Self::new(manager.into_client()).with_log_limit(config.log_limit))
    }
}

impl<C: Connection> RemoteStore for SurrealStore<C> {
    fn is_configured(&self) -> bool {
        self.db.is_some()
    }

    async fn subscribe_rooms(&self) -> StoreroomResult<Subscription<Room>> {
        let store = self.clone();
        let subscription = self
            .open_feed(ROOM_TABLE, move || {
                let store = store.clone();
                async move { store.list_rooms().await }
            })
            .await?;
        Ok(subscription)
    }

    async fn subscribe_logs(&self) -> StoreroomResult<Subscription<LogEntry>> {
        let store = self.clone();
        let subscription = self
            .open_feed(LOG_TABLE, move || {
                let store = store.clone();
                async move { store.list_logs(store.log_limit).await }
            })
            .await?;
        Ok(subscription)
    }

    async fn add_room(&self, input: CreateRoom) -> StoreroomResult<Room> {
        Ok(self.create_room(input).await?)
    }

    async fn update_room_fields(&self, id: Uuid, input: UpdateRoom) -> StoreroomResult<()> {
        Ok(self.update_room(id, input).await?)
    }

    async fn update_stock(&self, id: Uuid, material: &str, quantity: f64) -> StoreroomResult<()> {
        Ok(self.set_stock(id, material, quantity).await?)
    }

    async fn add_log(&self, input: CreateLogEntry) -> StoreroomResult<LogEntry> {
        Ok(self.append_log(input).await?)
    }

    async fn initialize(&self) -> StoreroomResult<bool> {
        let existing = self.count_rooms().await?;
        if existing > 0 {
            info!(rooms = existing, "Store already holds rooms; skipping seed");
            return Ok(false);
        }

        for seed in SEED_ROOMS {
            self.create_room(CreateRoom {
                name: seed.name.to_string(),
                temperature: seed.temperature,
            })
            .await?;
        }

        info!(rooms = SEED_ROOMS.len(), "Seeded initial room catalog");
        Ok(true)
    }
}
