//! Room queries.

use chrono::{DateTime, Utc};
use storeroom_core::models::room::{CreateRoom, Inventory, Room, UpdateRoom};
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::SurrealStore;
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct RoomRow {
    name: String,
    temperature: f64,
    inventory: serde_json::Value,
    fermentation_start: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct RoomRowWithId {
    record_id: String,
    name: String,
    temperature: f64,
    inventory: serde_json::Value,
    fermentation_start: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn decode_inventory(value: serde_json::Value) -> Result<Inventory, DbError> {
    match value {
        serde_json::Value::Null => Ok(Inventory::new()),
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(material, quantity)| {
                quantity.as_f64().map(|q| (material.clone(), q)).ok_or_else(|| {
                    DbError::Decode(format!("non-numeric quantity for material {material}"))
                })
            })
            .collect(),
        other => Err(DbError::Decode(format!(
            "inventory must be an object, got {other}"
        ))),
    }
}

fn row_to_room(row: RoomRow, id: Uuid) -> Result<Room, DbError> {
    Ok(Room {
        id,
        name: row.name,
        temperature: row.temperature,
        inventory: decode_inventory(row.inventory)?,
        fermentation_start: row.fermentation_start,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl RoomRowWithId {
    fn try_into_room(self) -> Result<Room, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid room UUID: {e}")))?;
        row_to_room(
            RoomRow {
                name: self.name,
                temperature: self.temperature,
                inventory: self.inventory,
                fermentation_start: self.fermentation_start,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            id,
        )
    }
}

fn ensure_finite(field: &str, value: f64) -> Result<(), DbError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DbError::InvalidValue(format!("{field} must be a finite number")))
    }
}

impl<C: Connection> SurrealStore<C> {
    pub(crate) async fn create_room(&self, input: CreateRoom) -> Result<Room, DbError> {
        ensure_finite("temperature", input.temperature)?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .client()?
            .query(
                "CREATE type::record('room', $id) SET \
                 name = $name, \
                 temperature = $temperature, \
                 inventory = {}, \
                 fermentation_start = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("temperature", input.temperature))
            .await?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RoomRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "room".into(),
            id: id_str,
        })?;

        debug!(room_id = %id, "Room created");
        row_to_room(row, id)
    }

    /// Fetch a single room straight from the store.
    pub async fn get_room(&self, id: Uuid) -> Result<Room, DbError> {
        let id_str = id.to_string();

        let mut result = self
            .client()?
            .query("SELECT * FROM type::record('room', $id)")
            .bind(("id", id_str.clone()))
            .await?;

        let rows: Vec<RoomRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "room".into(),
            id: id_str,
        })?;

        row_to_room(row, id)
    }

    /// All rooms, oldest first.
    pub async fn list_rooms(&self) -> Result<Vec<Room>, DbError> {
        let mut result = self
            .client()?
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM room \
                 ORDER BY created_at ASC",
            )
            .await?;

        let rows: Vec<RoomRowWithId> = result.take(0)?;
        rows.into_iter().map(RoomRowWithId::try_into_room).collect()
    }

    pub async fn count_rooms(&self) -> Result<u64, DbError> {
        let mut result = self
            .client()?
            .query("SELECT count() AS total FROM room GROUP ALL")
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    pub(crate) async fn update_room(&self, id: Uuid, input: UpdateRoom) -> Result<(), DbError> {
        if let Some(temperature) = input.temperature {
            ensure_finite("temperature", temperature)?;
        }

        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.temperature.is_some() {
            sets.push("temperature = $temperature");
        }
        match input.fermentation_start {
            Some(Some(_)) => sets.push("fermentation_start = $fermentation_start"),
            Some(None) => sets.push("fermentation_start = NONE"),
            None => {}
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('room', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.client()?.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(temperature) = input.temperature {
            builder = builder.bind(("temperature", temperature));
        }
        if let Some(Some(started)) = input.fermentation_start {
            builder = builder.bind(("fermentation_start", started));
        }

        let result = builder.await?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RoomRow> = result.take(0)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "room".into(),
                id: id_str,
            });
        }

        Ok(())
    }

    /// Write one material quantity, merging it into the inventory
    /// object so other materials are left as they are.
    pub(crate) async fn set_stock(
        &self,
        id: Uuid,
        material: &str,
        quantity: f64,
    ) -> Result<(), DbError> {
        ensure_finite("quantity", quantity)?;
        if quantity < 0.0 {
            return Err(DbError::InvalidValue(format!(
                "quantity for {material} must not be negative"
            )));
        }

        let id_str = id.to_string();
        let mut patch = serde_json::Map::new();
        patch.insert(material.to_string(), serde_json::Value::from(quantity));

        let result = self
            .client()?
            .query(
                "UPDATE type::record('room', $id) MERGE { \
                 inventory: $patch, \
                 updated_at: time::now() }",
            )
            .bind(("id", id_str.clone()))
            .bind(("patch", serde_json::Value::Object(patch)))
            .await?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RoomRow> = result.take(0)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "room".into(),
                id: id_str,
            });
        }

        Ok(())
    }
}
