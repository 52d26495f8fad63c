//! Live-query backed snapshot feeds.

use futures_util::StreamExt;
use storeroom_core::store::Subscription;
use surrealdb::Connection;
use surrealdb_types::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::SurrealStore;
use crate::error::DbError;

impl<C: Connection> SurrealStore<C> {
    /// Open a live query on `table` and feed full snapshots produced by
    /// `fetch` into a [`Subscription`].
    ///
    /// The live query is registered before the initial read so that no
    /// change between the two is missed. Every notification triggers a
    /// fresh read of the whole collection.
    pub(crate) async fn open_feed<T, F, Fut>(
        &self,
        table: &'static str,
        fetch: F,
    ) -> Result<Subscription<T>, DbError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Vec<T>, DbError>> + Send + 'static,
    {
        let db = self.client()?;
        let mut live = db.select::<Vec<Value>>(table).live().await?;

        let initial = fetch().await?;
        let (tx, rx) = watch::channel(Vec::new());
        let _ = tx.send(initial);

        let producer = tokio::spawn(async move {
            while let Some(notification) = live.next().await {
                if let Err(e) = notification {
                    warn!(table, error = %e, "Live query notification failed");
                    continue;
                }

                match fetch().await {
                    Ok(snapshot) => {
                        debug!(table, size = snapshot.len(), "Pushing snapshot");
                        if tx.send(snapshot).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(table, error = %e, "Failed to re-read collection after change");
                    }
                }
            }
            debug!(table, "Live feed closed");
        });

        info!(table, "Subscription opened");
        Ok(Subscription::new(table, rx, producer))
    }
}
