//! Shared fixtures for synchronization tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use storeroom_core::error::{StoreroomError, StoreroomResult};
use storeroom_core::models::log_entry::{CreateLogEntry, LogEntry};
use storeroom_core::models::room::{CreateRoom, Room, UpdateRoom};
use storeroom_core::store::{RemoteStore, Subscription};
use storeroom_db::SurrealStore;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

pub const WAIT: Duration = Duration::from_secs(5);

/// Helper: spin up in-memory DB, run migrations and wrap it in a store.
pub async fn memory_store() -> SurrealStore<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    storeroom_db::run_migrations(&db).await.unwrap();
    SurrealStore::new(db)
}

/// Store wrapper that can be told to fail room writes or log appends.
#[derive(Clone)]
pub struct FlakyStore {
    pub inner: SurrealStore<Db>,
    fail_writes: Arc<AtomicBool>,
    fail_logs: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new(inner: SurrealStore<Db>) -> Self {
        Self {
            inner,
            fail_writes: Arc::new(AtomicBool::new(false)),
            fail_logs: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_logs(&self, fail: bool) {
        self.fail_logs.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> StoreroomResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreroomError::Database("remote rejected the write".into()))
        } else {
            Ok(())
        }
    }
}

impl RemoteStore for FlakyStore {
    fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }

    async fn subscribe_rooms(&self) -> StoreroomResult<Subscription<Room>> {
        self.inner.subscribe_rooms().await
    }

    async fn subscribe_logs(&self) -> StoreroomResult<Subscription<LogEntry>> {
        self.inner.subscribe_logs().await
    }

    async fn add_room(&self, input: CreateRoom) -> StoreroomResult<Room> {
        self.check_write()?;
        self.inner.add_room(input).await
    }

    async fn update_room_fields(&self, id: uuid::Uuid, input: UpdateRoom) -> StoreroomResult<()> {
        self.check_write()?;
        self.inner.update_room_fields(id, input).await
    }

    async fn update_stock(
        &self,
        id: uuid::Uuid,
        material: &str,
        quantity: f64,
    ) -> StoreroomResult<()> {
        self.check_write()?;
        self.inner.update_stock(id, material, quantity).await
    }

    async fn add_log(&self, input: CreateLogEntry) -> StoreroomResult<LogEntry> {
        if self.fail_logs.load(Ordering::SeqCst) {
            return Err(StoreroomError::Database("log append rejected".into()));
        }
        self.inner.add_log(input).await
    }

    async fn initialize(&self) -> StoreroomResult<bool> {
        self.inner.initialize().await
    }
}
