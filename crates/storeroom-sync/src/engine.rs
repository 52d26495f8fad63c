//! Synchronization engine — owns the local mirror and keeps it in step
//! with the remote store's push subscriptions.

use std::sync::Arc;
use std::time::Duration;

use storeroom_core::error::{StoreroomError, StoreroomResult};
use storeroom_core::mirror::Mirror;
use storeroom_core::store::{RemoteStore, Subscription};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;

/// A running synchronization session.
///
/// Readers obtain the mirror through [`SyncEngine::mirror`]; only the
/// engine's feed tasks ever write it, and every write replaces a whole
/// collection with the snapshot the store pushed.
pub struct SyncEngine {
    mirror: watch::Receiver<Mirror>,
    feeds: Vec<JoinHandle<()>>,
}

impl SyncEngine {
    /// Start synchronizing with `store`.
    ///
    /// Refuses to start when the store is not configured. Seeds the
    /// store first if `config.seed_if_empty` is set, then opens the
    /// room and log subscriptions.
    pub async fn activate<S: RemoteStore>(store: &S, config: &SyncConfig) -> StoreroomResult<Self> {
        if !store.is_configured() {
            warn!("Refusing to synchronize: remote store is not configured");
            return Err(StoreroomError::Configuration(
                "remote store connection settings are missing".into(),
            ));
        }

        if config.seed_if_empty {
            let seeded = store.initialize().await?;
            debug!(seeded, "Seed check complete");
        }

        let rooms = store.subscribe_rooms().await?;
        let logs = match store.subscribe_logs().await {
            Ok(logs) => logs,
            Err(e) => {
                rooms.unsubscribe();
                return Err(e);
            }
        };

        let (sender, mirror) = watch::channel(Mirror::new());
        let sender = Arc::new(sender);

        let feeds = vec![
            spawn_feed(rooms, Arc::clone(&sender), Mirror::replace_rooms),
            spawn_feed(logs, sender, Mirror::replace_logs),
        ];

        info!("Synchronization active");
        Ok(Self { mirror, feeds })
    }

    /// A receiver that observes every mirror revision.
    pub fn mirror(&self) -> watch::Receiver<Mirror> {
        self.mirror.clone()
    }

    /// A copy of the mirror as it is right now.
    pub fn snapshot(&self) -> Mirror {
        self.mirror.borrow().clone()
    }

    /// Wait until the mirror satisfies `predicate`, or fail after
    /// `timeout`.
    pub async fn wait_for<F>(&self, timeout: Duration, predicate: F) -> StoreroomResult<Mirror>
    where
        F: FnMut(&Mirror) -> bool,
    {
        let mut receiver = self.mirror.clone();
        match tokio::time::timeout(timeout, receiver.wait_for(predicate)).await {
            Ok(Ok(mirror)) => Ok((*mirror).clone()),
            Ok(Err(_)) => Err(StoreroomError::Subscription(
                "mirror feeds have stopped".into(),
            )),
            Err(_) => Err(StoreroomError::Subscription(format!(
                "mirror did not reach the expected state within {timeout:?}"
            ))),
        }
    }

    /// Wait for the first snapshot of both collections.
    pub async fn wait_until_synced(&self, timeout: Duration) -> StoreroomResult<Mirror> {
        self.wait_for(timeout, Mirror::is_synced).await
    }

    /// True while both feeds are still running.
    pub fn is_active(&self) -> bool {
        !self.feeds.is_empty() && self.feeds.iter().all(|feed| !feed.is_finished())
    }

    /// Close both subscriptions and stop updating the mirror.
    pub async fn deactivate(mut self) {
        for feed in std::mem::take(&mut self.feeds) {
            feed.abort();
            let _ = feed.await;
        }
        info!("Synchronization stopped");
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        for feed in &self.feeds {
            feed.abort();
        }
    }
}

/// Apply every snapshot from `subscription` to the mirror. The
/// subscription is dropped, and thereby closed, when the task ends or
/// is aborted.
fn spawn_feed<T>(
    mut subscription: Subscription<T>,
    sender: Arc<watch::Sender<Mirror>>,
    apply: fn(&mut Mirror, Vec<T>),
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let collection = subscription.collection();
        while let Some(snapshot) = subscription.next().await {
            debug!(collection, size = snapshot.len(), "Applying snapshot");
            sender.send_modify(|mirror| apply(mirror, snapshot));
        }
        warn!(collection, "Subscription ended; mirror is no longer updated");
    })
}
