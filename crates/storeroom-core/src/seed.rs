//! Fixed catalog used to seed an empty store and the materials list.

/// A room created by the one-time seed.
#[derive(Debug, Clone, Copy)]
pub struct SeedRoom {
    pub name: &'static str,
    pub temperature: f64,
}

pub const SEED_ROOMS: &[SeedRoom] = &[
    SeedRoom {
        name: "Cold Store",
        temperature: 4.0,
    },
    SeedRoom {
        name: "Fermentation Room A",
        temperature: 24.0,
    },
    SeedRoom {
        name: "Fermentation Room B",
        temperature: 24.0,
    },
    SeedRoom {
        name: "Dry Store",
        temperature: 18.0,
    },
];

/// Materials always offered by the catalog, even before any room
/// stocks them.
pub const SEED_MATERIALS: &[&str] = &["سكر", "خميرة", "تمر", "شعير", "ماء"];
