//! Integration tests for the mutation service: role gating, audit
//! entries and the round trip back into the mirror.

mod common;

use common::{FlakyStore, WAIT, memory_store};
use storeroom_core::error::StoreroomError;
use storeroom_core::models::log_entry::LogAction;
use storeroom_core::models::role::Role;
use storeroom_core::models::room::{DEFAULT_TEMPERATURE, Room};
use storeroom_core::models::session::Session;
use storeroom_sync::{MutationService, SyncConfig, SyncEngine};
use uuid::Uuid;

struct Harness {
    store: FlakyStore,
    engine: SyncEngine,
    service: MutationService<FlakyStore>,
}

impl Harness {
    async fn new() -> Self {
        let store = FlakyStore::new(memory_store().await);
        let engine = SyncEngine::activate(
            &store,
            &SyncConfig {
                seed_if_empty: false,
            },
        )
        .await
        .unwrap();
        engine.wait_until_synced(WAIT).await.unwrap();
        let service = MutationService::new(store.clone(), engine.mirror());
        Self {
            store,
            engine,
            service,
        }
    }

    /// Add a room as Admin and wait until the mirror holds it.
    async fn room(&self, name: &str) -> Room {
        let room = self
            .service
            .add_room(&Session::new(Role::Admin), name)
            .await
            .unwrap();
        self.mirrored(room.id, |_| true).await
    }

    /// Wait until the mirrored copy of `id` satisfies `predicate`.
    async fn mirrored(&self, id: Uuid, predicate: impl Fn(&Room) -> bool) -> Room {
        let mirror = self
            .engine
            .wait_for(WAIT, |m| m.room(id).is_some_and(&predicate))
            .await
            .unwrap();
        mirror.room(id).cloned().unwrap()
    }

    async fn log_count(&self) -> u64 {
        self.store.inner.count_logs().await.unwrap()
    }
}

// -----------------------------------------------------------------------
// Add room
// -----------------------------------------------------------------------

#[tokio::test]
async fn admin_adds_room_with_one_audit_entry() {
    let h = Harness::new().await;

    let room = h.room("R1").await;

    assert_eq!(room.name, "R1");
    assert_eq!(room.temperature, DEFAULT_TEMPERATURE);
    assert!(room.inventory.is_empty());
    assert!(room.fermentation_start.is_none());

    let logs = h.store.inner.list_logs(None).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, LogAction::RoomCreated);
    assert_eq!(logs[0].room_name, "R1");
    assert_eq!(logs[0].details, "R1");
    assert_eq!(logs[0].user_role, Role::Admin);
}

#[tokio::test]
async fn guest_cannot_add_room() {
    let h = Harness::new().await;

    let err = h
        .service
        .add_room(&Session::new(Role::Guest), "R1")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreroomError::AuthorizationDenied {
            role: Role::Guest,
            ..
        }
    ));
    assert_eq!(h.store.inner.count_rooms().await.unwrap(), 0);
    assert_eq!(h.log_count().await, 0);
}

#[tokio::test]
async fn auditor_cannot_add_room() {
    let h = Harness::new().await;

    let result = h
        .service
        .add_room(&Session::new(Role::Auditor), "R1")
        .await;

    assert!(matches!(
        result,
        Err(StoreroomError::AuthorizationDenied { .. })
    ));
    assert_eq!(h.log_count().await, 0);
}

#[tokio::test]
async fn blank_room_name_is_rejected_before_any_write() {
    let h = Harness::new().await;

    let err = h
        .service
        .add_room(&Session::new(Role::Admin), "   ")
        .await
        .unwrap_err();

    assert!(matches!(err, StoreroomError::Validation { .. }));
    assert_eq!(h.store.inner.count_rooms().await.unwrap(), 0);
    assert_eq!(h.log_count().await, 0);
}

// -----------------------------------------------------------------------
// Stock
// -----------------------------------------------------------------------

#[tokio::test]
async fn stocking_a_new_material_starts_from_zero() {
    let h = Harness::new().await;
    let room = h.room("R1").await;

    let entry = h
        .service
        .adjust_stock(&Session::new(Role::Admin), room.id, "سكر", 10.0)
        .await
        .unwrap();

    assert_eq!(entry.action, LogAction::StockIn);
    assert_eq!(format!("{}: {}", entry.action, entry.details), "stock in: سكر: 0 → 10");
    assert_eq!(entry.room_name, "R1");

    let room = h
        .mirrored(room.id, |r| r.inventory.quantity("سكر") == 10.0)
        .await;
    assert_eq!(room.inventory.distinct_count(), 1);
    assert_eq!(h.log_count().await, 2);
}

#[tokio::test]
async fn stock_removal_clamps_at_zero_and_still_logs() {
    let h = Harness::new().await;
    let session = Session::new(Role::Guest);
    let room = h.room("Pantry").await;

    h.service
        .adjust_stock(&session, room.id, "hops", 5.0)
        .await
        .unwrap();
    h.mirrored(room.id, |r| r.inventory.quantity("hops") == 5.0)
        .await;

    let entry = h
        .service
        .adjust_stock(&session, room.id, "hops", -5.0)
        .await
        .unwrap();
    assert_eq!(entry.action, LogAction::StockOut);
    assert_eq!(entry.details, "hops: 5 → 0");
    h.mirrored(room.id, |r| r.inventory.quantity("hops") == 0.0)
        .await;

    let entry = h
        .service
        .adjust_stock(&session, room.id, "hops", -5.0)
        .await
        .unwrap();
    assert_eq!(entry.action, LogAction::StockOut);
    assert_eq!(entry.details, "hops: 0 → 0");

    let fetched = h.store.inner.get_room(room.id).await.unwrap();
    assert_eq!(fetched.inventory.quantity("hops"), 0.0);
    assert!(fetched.inventory.contains("hops"));
    assert_eq!(h.log_count().await, 4);
}

#[tokio::test]
async fn oversized_removal_does_not_go_negative() {
    let h = Harness::new().await;
    let session = Session::new(Role::Admin);
    let room = h.room("Pantry").await;

    h.service
        .adjust_stock(&session, room.id, "yeast", 3.0)
        .await
        .unwrap();
    h.mirrored(room.id, |r| r.inventory.quantity("yeast") == 3.0)
        .await;

    let entry = h
        .service
        .adjust_stock(&session, room.id, "yeast", -40.0)
        .await
        .unwrap();

    assert_eq!(entry.details, "yeast: 3 → 0");
    let room = h
        .mirrored(room.id, |r| r.inventory.quantity("yeast") == 0.0)
        .await;
    assert!(room.inventory.quantity("yeast") >= 0.0);
}

#[tokio::test]
async fn stock_changes_leave_other_materials_alone() {
    let h = Harness::new().await;
    let session = Session::new(Role::Auditor);
    let room = h.room("Pantry").await;

    h.service
        .adjust_stock(&session, room.id, "سكر", 4.0)
        .await
        .unwrap();
    h.mirrored(room.id, |r| r.inventory.contains("سكر")).await;
    h.service
        .adjust_stock(&session, room.id, "تمر", 2.0)
        .await
        .unwrap();

    let room = h
        .mirrored(room.id, |r| r.inventory.distinct_count() == 2)
        .await;
    assert_eq!(room.inventory.quantity("سكر"), 4.0);
    assert_eq!(room.inventory.quantity("تمر"), 2.0);
}

#[tokio::test]
async fn blank_material_is_rejected() {
    let h = Harness::new().await;
    let room = h.room("Pantry").await;

    let err = h
        .service
        .adjust_stock(&Session::new(Role::Admin), room.id, " ", 1.0)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreroomError::Validation { .. }));
    assert_eq!(h.log_count().await, 1);
}

// -----------------------------------------------------------------------
// Temperature and fermentation
// -----------------------------------------------------------------------

#[tokio::test]
async fn temperature_change_records_before_and_after() {
    let h = Harness::new().await;
    let room = h.room("Cold Store").await;

    let entry = h
        .service
        .update_temperature(&Session::new(Role::Guest), room.id, 4.5)
        .await
        .unwrap();

    assert_eq!(entry.action, LogAction::TemperatureChanged);
    assert_eq!(entry.details, "20° → 4.5°");
    assert_eq!(entry.user_role, Role::Guest);
    h.mirrored(room.id, |r| r.temperature == 4.5).await;
}

#[tokio::test]
async fn non_finite_temperature_is_rejected() {
    let h = Harness::new().await;
    let room = h.room("Cold Store").await;

    let err = h
        .service
        .update_temperature(&Session::new(Role::Admin), room.id, f64::NAN)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreroomError::Validation { .. }));
    assert_eq!(h.log_count().await, 1);
}

#[tokio::test]
async fn toggling_fermentation_twice_restores_idle() {
    let h = Harness::new().await;
    let session = Session::new(Role::Auditor);
    let room = h.room("Vat").await;

    let entry = h
        .service
        .toggle_fermentation(&session, room.id)
        .await
        .unwrap();
    assert_eq!(entry.action, LogAction::FermentationStarted);
    let fermenting = h.mirrored(room.id, Room::is_fermenting).await;
    let started = fermenting.fermentation_start.unwrap();
    assert!(started.timestamp_millis() > 0);

    let entry = h
        .service
        .toggle_fermentation(&session, room.id)
        .await
        .unwrap();
    assert_eq!(entry.action, LogAction::FermentationStopped);
    let idle = h.mirrored(room.id, |r| !r.is_fermenting()).await;
    assert!(idle.fermentation_start.is_none());

    assert_eq!(h.log_count().await, 3);
}

// -----------------------------------------------------------------------
// Rename
// -----------------------------------------------------------------------

#[tokio::test]
async fn rename_keeps_old_names_in_past_entries() {
    let h = Harness::new().await;
    let admin = Session::new(Role::Admin);
    let room = h.room("Vat").await;

    h.service
        .adjust_stock(&admin, room.id, "hops", 1.0)
        .await
        .unwrap();
    let entry = h
        .service
        .rename_room(&admin, room.id, "Vat 2")
        .await
        .unwrap();
    assert_eq!(entry.action, LogAction::RoomRenamed);
    assert_eq!(entry.details, "Vat → Vat 2");

    h.mirrored(room.id, |r| r.name == "Vat 2").await;

    let logs = h.store.inner.list_logs(None).await.unwrap();
    assert_eq!(logs.len(), 3);
    assert!(logs.iter().all(|l| l.room_name == "Vat"));
}

#[tokio::test]
async fn guest_cannot_rename() {
    let h = Harness::new().await;
    let room = h.room("Vat").await;

    let err = h
        .service
        .rename_room(&Session::new(Role::Guest), room.id, "Mine")
        .await
        .unwrap_err();

    assert!(matches!(err, StoreroomError::AuthorizationDenied { .. }));
    assert_eq!(h.store.inner.get_room(room.id).await.unwrap().name, "Vat");
}

// -----------------------------------------------------------------------
// Failures and audit accounting
// -----------------------------------------------------------------------

#[tokio::test]
async fn unknown_room_is_rejected_without_logging() {
    let h = Harness::new().await;
    let session = Session::new(Role::Admin);
    let missing = Uuid::new_v4();

    let err = h
        .service
        .update_temperature(&session, missing, 10.0)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreroomError::NotFound { .. }));

    let err = h
        .service
        .toggle_fermentation(&session, missing)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreroomError::NotFound { .. }));

    assert_eq!(h.log_count().await, 0);
}

#[tokio::test]
async fn failed_write_produces_no_audit_entry() {
    let h = Harness::new().await;
    let session = Session::new(Role::Admin);
    let room = h.room("Pantry").await;

    h.store.fail_writes(true);

    let err = h
        .service
        .adjust_stock(&session, room.id, "hops", 2.0)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreroomError::Database(_)));

    let err = h
        .service
        .toggle_fermentation(&session, room.id)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreroomError::Database(_)));

    let err = h.service.add_room(&session, "Other").await.unwrap_err();
    assert!(matches!(err, StoreroomError::Database(_)));

    assert_eq!(h.log_count().await, 1);
    let fetched = h.store.inner.get_room(room.id).await.unwrap();
    assert!(fetched.inventory.is_empty());
    assert!(fetched.fermentation_start.is_none());
}

#[tokio::test]
async fn failed_append_after_write_is_reported() {
    let h = Harness::new().await;
    let room = h.room("Pantry").await;

    h.store.fail_logs(true);

    let err = h
        .service
        .update_temperature(&Session::new(Role::Admin), room.id, 11.0)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreroomError::AuditAppend(_)));
    h.mirrored(room.id, |r| r.temperature == 11.0).await;
    assert_eq!(h.log_count().await, 1);
}

#[tokio::test]
async fn audit_entries_match_successful_mutations() {
    let h = Harness::new().await;
    let admin = Session::new(Role::Admin);
    let guest = Session::new(Role::Guest);
    let mut successes = 0u64;

    let room = h.room("Main").await;
    successes += 1;

    let attempts = [
        h.service.add_room(&guest, "Denied").await.map(|_| ()),
        h.service.add_room(&admin, "").await.map(|_| ()),
        h.service
            .update_temperature(&guest, room.id, 19.0)
            .await
            .map(|_| ()),
        h.service
            .adjust_stock(&guest, Uuid::new_v4(), "hops", 1.0)
            .await
            .map(|_| ()),
        h.service
            .toggle_fermentation(&admin, room.id)
            .await
            .map(|_| ()),
    ];
    successes += attempts.iter().filter(|r| r.is_ok()).count() as u64;

    h.store.fail_writes(true);
    let failed = h.service.adjust_stock(&admin, room.id, "hops", 1.0).await;
    assert!(failed.is_err());
    h.store.fail_writes(false);

    assert_eq!(successes, 3);
    assert_eq!(h.log_count().await, successes);
}
