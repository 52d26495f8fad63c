//! Derived views over the mirrored room list.
//!
//! Every view is recomputed from the rooms it is given; nothing is
//! cached, so a view can never lag behind the mirror it was read from.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::room::Room;
use crate::seed::SEED_MATERIALS;

/// Aggregate counters shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomStats {
    pub total_rooms: usize,
    pub active_fermentations: usize,
    /// Sum over rooms of the distinct material keys in each inventory.
    pub material_entries: usize,
}

/// Union of the seed materials and every material stocked in any room.
pub fn materials_catalog(rooms: &[Room]) -> BTreeSet<String> {
    let mut catalog: BTreeSet<String> = SEED_MATERIALS.iter().map(|m| m.to_string()).collect();
    for room in rooms {
        catalog.extend(room.inventory.materials().map(str::to_string));
    }
    catalog
}

/// Rooms whose name or any material name contains `query`,
/// case-insensitively. The query is matched as typed, surrounding
/// whitespace included. An empty or all-whitespace query returns every
/// room. Order is preserved.
pub fn filter_rooms<'a>(rooms: &'a [Room], query: &str) -> Vec<&'a Room> {
    if query.trim().is_empty() {
        return rooms.iter().collect();
    }
    let needle = query.to_lowercase();

    rooms
        .iter()
        .filter(|room| {
            room.name.to_lowercase().contains(&needle)
                || room
                    .inventory
                    .materials()
                    .any(|material| material.to_lowercase().contains(&needle))
        })
        .collect()
}

pub fn room_stats(rooms: &[Room]) -> RoomStats {
    RoomStats {
        total_rooms: rooms.len(),
        active_fermentations: rooms.iter().filter(|r| r.is_fermenting()).count(),
        material_entries: rooms.iter().map(|r| r.inventory.distinct_count()).sum(),
    }
}
