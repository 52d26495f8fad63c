//! Room domain model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Temperature assigned to rooms created without an explicit reading.
pub const DEFAULT_TEMPERATURE: f64 = 20.0;

/// Clamp a computed quantity into the valid range. Anything not
/// strictly positive (including `-0.0` and NaN) becomes `0.0`.
pub fn clamp_quantity(quantity: f64) -> f64 {
    if quantity > 0.0 { quantity } else { 0.0 }
}

/// Material quantities held in a room.
///
/// Keys are dynamic: any material name may appear at any time. A
/// material that is absent has a quantity of zero, and no quantity is
/// ever stored below zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory(BTreeMap<String, f64>);

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantity of `material`, zero when the material was never stocked.
    pub fn quantity(&self, material: &str) -> f64 {
        self.0.get(material).copied().unwrap_or(0.0)
    }

    /// Set the quantity for `material`, clamped at zero.
    pub fn set(&mut self, material: impl Into<String>, quantity: f64) {
        self.0.insert(material.into(), clamp_quantity(quantity));
    }

    pub fn contains(&self, material: &str) -> bool {
        self.0.contains_key(material)
    }

    /// Material names present in this inventory, in sorted order.
    pub fn materials(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of distinct material keys, including zero-quantity entries.
    pub fn distinct_count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut inventory = Inventory::new();
        for (material, quantity) in iter {
            inventory.set(material, quantity);
        }
        inventory
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub temperature: f64,
    pub inventory: Inventory,
    /// `Some` while fermentation is active, holding the instant it began.
    pub fermentation_start: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    pub fn is_fermenting(&self) -> bool {
        self.fermentation_start.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoom {
    pub name: String,
    pub temperature: f64,
}

impl CreateRoom {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRoom {
    pub name: Option<String>,
    pub temperature: Option<f64>,
    /// `Some(Some(ts))` = start, `Some(None)` = stop, `None` = no change.
    pub fermentation_start: Option<Option<DateTime<Utc>>>,
}

impl UpdateRoom {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.temperature.is_none() && self.fermentation_start.is_none()
    }
}
