//! Remote store capability consumed by the synchronization and
//! mutation layers.
//!
//! All operations are async and may fail. Subscriptions are
//! long-lived push channels that deliver the full current collection
//! whenever any record in it changes.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::StoreroomResult;
use crate::models::log_entry::{CreateLogEntry, LogEntry};
use crate::models::room::{CreateRoom, Room, UpdateRoom};

/// Handle to a push subscription over one collection.
///
/// Each item received is a complete snapshot, never a diff. Only the
/// newest snapshot is held: a consumer that falls behind skips
/// straight to the latest state. Dropping the handle or calling
/// [`Subscription::unsubscribe`] stops the producer and releases the
/// server-side subscription.
#[derive(Debug)]
pub struct Subscription<T> {
    collection: &'static str,
    receiver: watch::Receiver<Vec<T>>,
    producer: Option<JoinHandle<()>>,
}

impl<T> Subscription<T> {
    /// Wrap a snapshot channel fed by `producer`. The value the
    /// channel was created with is treated as already seen.
    pub fn new(
        collection: &'static str,
        receiver: watch::Receiver<Vec<T>>,
        producer: JoinHandle<()>,
    ) -> Self {
        Self {
            collection,
            receiver,
            producer: Some(producer),
        }
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    /// Wait for the next snapshot. `None` once the producer has stopped
    /// and the newest snapshot has been taken.
    pub async fn next(&mut self) -> Option<Vec<T>>
    where
        T: Clone,
    {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    pub fn is_active(&self) -> bool {
        self.producer
            .as_ref()
            .is_some_and(|producer| !producer.is_finished())
    }

    pub fn unsubscribe(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Push-based document store holding the `rooms` and `logs`
/// collections.
pub trait RemoteStore: Send + Sync {
    /// Whether a connection to the remote store was configured. When
    /// false, no other operation may be attempted.
    fn is_configured(&self) -> bool;

    fn subscribe_rooms(&self) -> impl Future<Output = StoreroomResult<Subscription<Room>>> + Send;

    fn subscribe_logs(
        &self,
    ) -> impl Future<Output = StoreroomResult<Subscription<LogEntry>>> + Send;

    /// Create a room with a generated id, an empty inventory and no
    /// active fermentation.
    fn add_room(&self, input: CreateRoom) -> impl Future<Output = StoreroomResult<Room>> + Send;

    fn update_room_fields(
        &self,
        id: Uuid,
        input: UpdateRoom,
    ) -> impl Future<Output = StoreroomResult<()>> + Send;

    /// Write `quantity` for a single material, leaving the rest of the
    /// inventory untouched.
    fn update_stock(
        &self,
        id: Uuid,
        material: &str,
        quantity: f64,
    ) -> impl Future<Output = StoreroomResult<()>> + Send;

    /// Append an audit entry. The store assigns the id, and the
    /// timestamp when the input carries none.
    fn add_log(
        &self,
        input: CreateLogEntry,
    ) -> impl Future<Output = StoreroomResult<LogEntry>> + Send;

    /// Seed the fixed room catalog if the store holds no rooms.
    /// Returns `true` when rooms were created, `false` when the call
    /// was a no-op.
    fn initialize(&self) -> impl Future<Output = StoreroomResult<bool>> + Send;
}
