//! Local mirror of the remote store.
//!
//! The mirror is written only when a subscription pushes a snapshot,
//! and each push replaces the whole collection it carries. Nothing in
//! this type merges or patches individual records.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::models::log_entry::LogEntry;
use crate::models::room::Room;
use crate::views::{self, RoomStats};

#[derive(Debug, Clone, Default)]
pub struct Mirror {
    rooms: Vec<Room>,
    logs: Vec<LogEntry>,
    rooms_synced: bool,
    logs_synced: bool,
    revision: u64,
}

impl Mirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the room collection with a pushed snapshot.
    pub fn replace_rooms(&mut self, rooms: Vec<Room>) {
        self.rooms = rooms;
        self.rooms_synced = true;
        self.revision += 1;
    }

    /// Replace the log collection with a pushed snapshot.
    pub fn replace_logs(&mut self, logs: Vec<LogEntry>) {
        self.logs = logs;
        self.logs_synced = true;
        self.revision += 1;
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Audit entries as last pushed, newest first.
    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn room(&self, id: Uuid) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == id)
    }

    pub fn room_by_name(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.name == name)
    }

    /// True once both collections have received their first snapshot.
    pub fn is_synced(&self) -> bool {
        self.rooms_synced && self.logs_synced
    }

    /// Number of snapshots applied since the mirror was created.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn materials_catalog(&self) -> BTreeSet<String> {
        views::materials_catalog(&self.rooms)
    }

    pub fn filter_rooms(&self, query: &str) -> Vec<&Room> {
        views::filter_rooms(&self.rooms, query)
    }

    pub fn stats(&self) -> RoomStats {
        views::room_stats(&self.rooms)
    }
}
