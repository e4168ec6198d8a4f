use chrono::Utc;
use serde::Serialize;
use wiz_core::{ClientId, FlagKey, FlagStore};
use wiz_shared::cedis_to_pesewas;

use crate::room::{Rate, Room, RoomStatus};

const UNIFORM_AMENITIES: &[&str] = &[
    "High speed Wi-Fi connection",
    "Air conditioning",
    "Beach access (Guests can be driven to nearby beaches)",
    "Dedicated workspace (An area for focused activities that includes a desk or table and a power source)",
    "Exercise equipment",
    "Fire extinguisher",
    "Free parking on premise (Parking on-site that's free of charge)",
    "Kitchen",
    "Smoke alarms",
    "Tv",
];

const LONG_STAY_AMENITIES: &[&str] = &[
    "High speed Wi-Fi connection",
    "Air conditioning",
    "Beach access (Guests can be driven to nearby beaches)",
    "Exercise equipment",
    "Fire extinguisher",
    "Free parking on premise (Parking on-site that's free of charge)",
    "Kitchen",
    "Smoke alarms",
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Room not found: {0}")]
    NotFound(String),

    #[error("Invalid room: {0}")]
    Invalid(String),

    #[error("Inventory storage failed: {0}")]
    Storage(String),
}

/// The rental units offered to guests. Built once at startup and never
/// mutated by guest-facing flows.
#[derive(Debug, Clone)]
pub struct Catalog {
    rooms: Vec<Room>,
}

impl Catalog {
    pub fn new(rooms: Vec<Room>) -> Result<Self, CatalogError> {
        for room in &rooms {
            room.validate().map_err(CatalogError::Invalid)?;
        }
        Ok(Self { rooms })
    }

    /// The units WIZ Homes lists today.
    pub fn builtin() -> Self {
        let rooms = vec![
            Room {
                id: "wiz-short-stay-01".to_string(),
                name: "WIZ Short Stay Apartment".to_string(),
                rate: Rate::Nightly { price_pesewas: cedis_to_pesewas(1000) },
                status: RoomStatus::Available,
                amenities: strings(UNIFORM_AMENITIES),
                image_url: "/room1.jpeg".to_string(),
                gallery: strings(&[
                    "/room1.jpeg",
                    "/room2.jpeg",
                    "/room3.jpeg",
                    "/room4,.jpeg",
                    "/room5,.jpeg",
                    "/room6,.jpeg",
                    "/room7,.jpeg",
                    "/room8,.jpeg",
                    "/room9,.jpeg",
                    "/room10..jpeg",
                    "/room11,,.jpeg",
                    "/room13 (2).jpeg",
                ]),
                rating: 4.8,
                location: "Wiz Homes".to_string(),
                description: "Perfect for short stays, this modern apartment offers all the amenities you need for a comfortable visit. Ideal for business travelers or tourists exploring the city. Features a cozy bedroom, fully equipped kitchen, and convenient location.".to_string(),
            },
            Room {
                id: "wiz-apt-02".to_string(),
                name: "WIZ Long Stay Apartments".to_string(),
                rate: Rate::Monthly { price_pesewas: cedis_to_pesewas(4000) },
                status: RoomStatus::Available,
                amenities: strings(LONG_STAY_AMENITIES),
                image_url: "/wiz urban residence 1.jpeg".to_string(),
                gallery: strings(&[
                    "/wiz urban residence 1.jpeg",
                    "/urban residence 2.jpeg",
                    "/urban residence 3.jpeg",
                    "/urban residence 4.jpeg",
                ]),
                rating: 4.7,
                location: "Wiz Homes".to_string(),
                description: "Premier long-term residence at an unbeatable value. This modern apartment offers a spacious layout, high ceilings, and full access to building amenities. Perfect for professionals looking for a stable, high-quality home base.".to_string(),
            },
        ];
        Self { rooms }
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn get(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct InventoryStats {
    pub total_units: usize,
    pub available_units: usize,
}

impl InventoryStats {
    pub fn of(rooms: &[Room]) -> Self {
        Self {
            total_units: rooms.len(),
            available_units: rooms.iter().filter(|r| r.is_available()).count(),
        }
    }
}

/// Operator-side inventory edits. Changes live in the browser's cached copy
/// of the room list only; the catalog guests see is untouched.
pub struct InventoryEditor<'a> {
    catalog: &'a Catalog,
    flags: &'a dyn FlagStore,
}

impl<'a> InventoryEditor<'a> {
    pub fn new(catalog: &'a Catalog, flags: &'a dyn FlagStore) -> Self {
        Self { catalog, flags }
    }

    /// The cached list for this browser, or the catalog when nothing (or
    /// nothing readable) is cached.
    pub async fn load(&self, client: &ClientId) -> Result<Vec<Room>, CatalogError> {
        let cached = self
            .flags
            .get_flag(client, FlagKey::CachedRooms)
            .await
            .map_err(|e| CatalogError::Storage(e.to_string()))?;

        match cached {
            Some(json) => match serde_json::from_str::<Vec<Room>>(&json) {
                Ok(rooms) => Ok(rooms),
                Err(e) => {
                    tracing::warn!("Discarding unreadable cached inventory for {}: {}", client, e);
                    Ok(self.catalog.rooms().to_vec())
                }
            },
            None => Ok(self.catalog.rooms().to_vec()),
        }
    }

    async fn save(&self, client: &ClientId, rooms: &[Room]) -> Result<(), CatalogError> {
        let json = serde_json::to_string(rooms).map_err(|e| CatalogError::Storage(e.to_string()))?;
        self.flags
            .set_flag(client, FlagKey::CachedRooms, &json)
            .await
            .map_err(|e| CatalogError::Storage(e.to_string()))
    }

    /// Appends a unit with the default template values.
    pub async fn create_unit(&self, client: &ClientId) -> Result<Room, CatalogError> {
        let mut rooms = self.load(client).await?;
        let room = new_unit_template();
        rooms.push(room.clone());
        self.save(client, &rooms).await?;
        tracing::info!("Added local unit {} for {}", room.id, client);
        Ok(room)
    }

    pub async fn update_unit(&self, client: &ClientId, room: Room) -> Result<Room, CatalogError> {
        room.validate().map_err(CatalogError::Invalid)?;

        let mut rooms = self.load(client).await?;
        let slot = rooms
            .iter_mut()
            .find(|r| r.id == room.id)
            .ok_or_else(|| CatalogError::NotFound(room.id.clone()))?;
        *slot = room.clone();

        self.save(client, &rooms).await?;
        Ok(room)
    }
}

/// Defaults for a unit added from the admin console.
pub fn new_unit_template() -> Room {
    Room {
        id: format!("R{}", Utc::now().timestamp_millis()),
        name: "New Luxury Unit".to_string(),
        rate: Rate::Nightly { price_pesewas: cedis_to_pesewas(100) },
        status: RoomStatus::Available,
        amenities: vec!["Wifi".to_string()],
        image_url: "https://images.unsplash.com/photo-1502672260266-1c1ef2d93688?auto=format&fit=crop&q=80&w=800".to_string(),
        gallery: Vec::new(),
        rating: 5.0,
        location: "TBD".to_string(),
        description: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiz_store::memory::MemoryFlagStore;

    #[test]
    fn test_builtin_catalog_lookup() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.rooms().len(), 2);

        let short_stay = catalog.get("wiz-short-stay-01").unwrap();
        assert_eq!(short_stay.rate, Rate::Nightly { price_pesewas: 100_000 });

        let long_stay = catalog.get("wiz-apt-02").unwrap();
        assert_eq!(long_stay.rate, Rate::Monthly { price_pesewas: 400_000 });

        assert!(catalog.get("missing").is_none());
        assert!(Catalog::new(catalog.rooms().to_vec()).is_ok());
    }

    #[test]
    fn test_stats_count_available_units() {
        let mut rooms = Catalog::builtin().rooms().to_vec();
        rooms[1].status = RoomStatus::Booked;
        assert_eq!(InventoryStats::of(&rooms), InventoryStats { total_units: 2, available_units: 1 });
    }

    #[tokio::test]
    async fn test_editor_keeps_edits_local_to_client() {
        let catalog = Catalog::builtin();
        let flags = MemoryFlagStore::new();
        let editor = InventoryEditor::new(&catalog, &flags);
        let operator = ClientId::parse("operator-browser").unwrap();
        let other = ClientId::parse("other-browser").unwrap();

        let created = editor.create_unit(&operator).await.unwrap();
        assert_eq!(created.name, "New Luxury Unit");
        assert_eq!(created.rate, Rate::Nightly { price_pesewas: 10_000 });

        let mut edited = created.clone();
        edited.name = "Beach Suite".to_string();
        editor.update_unit(&operator, edited).await.unwrap();

        let rooms = editor.load(&operator).await.unwrap();
        assert_eq!(rooms.len(), 3);
        assert!(rooms.iter().any(|r| r.name == "Beach Suite"));

        // Other browsers and the guest catalog are unaffected
        assert_eq!(editor.load(&other).await.unwrap().len(), 2);
        assert_eq!(catalog.rooms().len(), 2);
    }

    #[tokio::test]
    async fn test_editor_rejects_unknown_unit() {
        let catalog = Catalog::builtin();
        let flags = MemoryFlagStore::new();
        let editor = InventoryEditor::new(&catalog, &flags);
        let client = ClientId::parse("operator-browser").unwrap();

        let mut ghost = new_unit_template();
        ghost.id = "R0".to_string();
        let result = editor.update_unit(&client, ghost).await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }
}
