//! Storeroom Server — mirrors the remote store and reports every
//! revision of the local view until interrupted.

use std::process::ExitCode;

use storeroom_core::error::StoreroomError;
use storeroom_core::mirror::Mirror;
use storeroom_db::{DbConfig, SurrealStore};
use storeroom_sync::{SyncConfig, SyncEngine};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

fn init_tracing() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "storeroom=info".parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt().with_env_filter(filter).json().init();
}

fn report(mirror: &Mirror) {
    let stats = mirror.stats();
    info!(
        revision = mirror.revision(),
        rooms = stats.total_rooms,
        active_fermentations = stats.active_fermentations,
        material_entries = stats.material_entries,
        catalog = mirror.materials_catalog().len(),
        log_entries = mirror.logs().len(),
        "Mirror updated"
    );
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    info!("Starting storeroom server...");

    let config = DbConfig::from_env();
    let store = match SurrealStore::connect(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Failed to connect to the remote store");
            return ExitCode::FAILURE;
        }
    };

    let engine = match SyncEngine::activate(&store, &SyncConfig::default()).await {
        Ok(engine) => engine,
        Err(StoreroomError::Configuration(reason)) => {
            error!(
                %reason,
                "Remote store is not configured; set STOREROOM_DB_URL to enable synchronization"
            );
            return ExitCode::from(2);
        }
        Err(e) => {
            error!(error = %e, "Failed to start synchronization");
            return ExitCode::FAILURE;
        }
    };

    let mut mirror = engine.mirror();
    loop {
        tokio::select! {
            changed = mirror.changed() => {
                if changed.is_err() {
                    error!("Mirror feeds stopped unexpectedly");
                    break;
                }
                let current = mirror.borrow_and_update().clone();
                report(&current);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    engine.deactivate().await;
    info!("Storeroom server stopped.");
    ExitCode::SUCCESS
}
