//! Mutation service — role-gated writes, each followed by exactly one
//! audit entry.
//!
//! Every operation reads the "before" values from the local mirror,
//! writes the intended new value through the remote store, and only
//! after the write succeeds appends the audit entry. The mirror itself
//! is never touched here: the change becomes visible locally when the
//! store pushes it back.

use chrono::{DateTime, Utc};
use storeroom_core::access::{self, Action};
use storeroom_core::error::{StoreroomError, StoreroomResult};
use storeroom_core::mirror::Mirror;
use storeroom_core::models::log_entry::{CreateLogEntry, LogAction, LogEntry};
use storeroom_core::models::room::{CreateRoom, Room, UpdateRoom, clamp_quantity};
use storeroom_core::models::session::Session;
use storeroom_core::store::RemoteStore;
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

const FERMENTATION_STARTED_DETAILS: &str = "Fermentation cycle started";
const FERMENTATION_STOPPED_DETAILS: &str = "Fermentation cycle stopped";

/// Mutation service.
///
/// Generic over the store implementation so that this layer has no
/// dependency on the database crate.
pub struct MutationService<S: RemoteStore> {
    store: S,
    mirror: watch::Receiver<Mirror>,
}

impl<S: RemoteStore> MutationService<S> {
    pub fn new(store: S, mirror: watch::Receiver<Mirror>) -> Self {
        Self { store, mirror }
    }

    /// Create a room. Admin only.
    pub async fn add_room(&self, session: &Session, name: &str) -> StoreroomResult<Room> {
        authorize(session, Action::AddRoom)?;
        let name = required("room name", name)?;

        let room = self
            .store
            .add_room(CreateRoom::named(name))
            .await
            .inspect_err(|e| warn!(error = %e, "Room creation failed; nothing recorded"))?;

        self.record(session, &room.name, LogAction::RoomCreated, room.name.clone())
            .await?;
        Ok(room)
    }

    /// Rename a room. Admin only. Earlier audit entries keep the name
    /// they were recorded with.
    pub async fn rename_room(
        &self,
        session: &Session,
        room_id: Uuid,
        new_name: &str,
    ) -> StoreroomResult<LogEntry> {
        authorize(session, Action::RenameRoom)?;
        let new_name = required("room name", new_name)?;
        let room = self.current_room(room_id)?;

        self.write(
            room_id,
            UpdateRoom {
                name: Some(new_name.clone()),
                ..Default::default()
            },
        )
        .await?;

        let details = format!("{} → {}", room.name, new_name);
        self.record(session, &room.name, LogAction::RoomRenamed, details)
            .await
    }

    pub async fn update_temperature(
        &self,
        session: &Session,
        room_id: Uuid,
        temperature: f64,
    ) -> StoreroomResult<LogEntry> {
        authorize(session, Action::UpdateTemperature)?;
        if !temperature.is_finite() {
            return Err(StoreroomError::validation(
                "temperature must be a finite number",
            ));
        }
        let room = self.current_room(room_id)?;

        self.write(
            room_id,
            UpdateRoom {
                temperature: Some(temperature),
                ..Default::default()
            },
        )
        .await?;

        let details = format!("{}° → {}°", room.temperature, temperature);
        self.record(session, &room.name, LogAction::TemperatureChanged, details)
            .await
    }

    /// Add `delta` (negative to remove) to a material's quantity. The
    /// result is clamped at zero rather than rejected.
    pub async fn adjust_stock(
        &self,
        session: &Session,
        room_id: Uuid,
        material: &str,
        delta: f64,
    ) -> StoreroomResult<LogEntry> {
        authorize(session, Action::AdjustStock)?;
        let material = required("material name", material)?;
        if !delta.is_finite() {
            return Err(StoreroomError::validation(
                "stock delta must be a finite number",
            ));
        }
        let room = self.current_room(room_id)?;

        let previous = room.inventory.quantity(&material);
        let updated = clamp_quantity(previous + delta);

        self.store
            .update_stock(room_id, &material, updated)
            .await
            .inspect_err(|e| warn!(room_id = %room_id, error = %e, "Stock write failed; nothing recorded"))?;

        let action = if delta > 0.0 {
            LogAction::StockIn
        } else {
            LogAction::StockOut
        };
        let details = format!("{material}: {previous} → {updated}");
        self.record(session, &room.name, action, details).await
    }

    /// Start fermentation if it is idle, stop it if it is running.
    pub async fn toggle_fermentation(
        &self,
        session: &Session,
        room_id: Uuid,
    ) -> StoreroomResult<LogEntry> {
        authorize(session, Action::ToggleFermentation)?;
        let room = self.current_room(room_id)?;

        let (next, action, details): (Option<DateTime<Utc>>, _, _) = match room.fermentation_start {
            Some(_) => (
                None,
                LogAction::FermentationStopped,
                FERMENTATION_STOPPED_DETAILS,
            ),
            None => (
                Some(Utc::now()),
                LogAction::FermentationStarted,
                FERMENTATION_STARTED_DETAILS,
            ),
        };

        self.write(
            room_id,
            UpdateRoom {
                fermentation_start: Some(next),
                ..Default::default()
            },
        )
        .await?;

        self.record(session, &room.name, action, details.to_string())
            .await
    }

    /// The room as the mirror currently holds it. The values read here
    /// may lag behind concurrent writes from other sessions.
    fn current_room(&self, room_id: Uuid) -> StoreroomResult<Room> {
        self.mirror
            .borrow()
            .room(room_id)
            .cloned()
            .ok_or_else(|| StoreroomError::room_not_found(room_id))
    }

    async fn write(&self, room_id: Uuid, update: UpdateRoom) -> StoreroomResult<()> {
        self.store
            .update_room_fields(room_id, update)
            .await
            .inspect_err(|e| warn!(room_id = %room_id, error = %e, "Room write failed; nothing recorded"))
    }

    async fn record(
        &self,
        session: &Session,
        room_name: &str,
        action: LogAction,
        details: String,
    ) -> StoreroomResult<LogEntry> {
        let entry = CreateLogEntry::new(session.role(), room_name, action, details);
        match self.store.add_log(entry).await {
            Ok(entry) => {
                info!(
                    role = %session.role(),
                    room = %room_name,
                    action = %action,
                    "Mutation recorded"
                );
                Ok(entry)
            }
            Err(e) => {
                error!(
                    room = %room_name,
                    action = %action,
                    error = %e,
                    "Write committed but audit entry could not be appended"
                );
                Err(StoreroomError::AuditAppend(e.to_string()))
            }
        }
    }
}

fn authorize(session: &Session, action: Action) -> StoreroomResult<()> {
    access::authorize(session.role(), action)
        .inspect_err(|_| warn!(role = %session.role(), action = %action, "Mutation denied"))
}

fn required(field: &str, value: &str) -> StoreroomResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreroomError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}
