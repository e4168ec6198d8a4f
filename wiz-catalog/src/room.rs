use serde::{Deserialize, Serialize};

/// How a unit is charged. Nightly units are billed per night of the stay,
/// monthly units at a flat price whatever dates are picked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "frequency")]
pub enum Rate {
    #[serde(rename = "night")]
    Nightly { price_pesewas: i64 },
    #[serde(rename = "month")]
    Monthly { price_pesewas: i64 },
}

impl Rate {
    pub fn price(&self) -> i64 {
        match self {
            Rate::Nightly { price_pesewas } | Rate::Monthly { price_pesewas } => *price_pesewas,
        }
    }

    pub fn frequency(&self) -> &'static str {
        match self {
            Rate::Nightly { .. } => "night",
            Rate::Monthly { .. } => "month",
        }
    }

    pub fn total(&self, nights: u32) -> i64 {
        match self {
            Rate::Nightly { price_pesewas } => price_pesewas.saturating_mul(i64::from(nights)),
            Rate::Monthly { price_pesewas } => *price_pesewas,
        }
    }

    /// Nights carried into checkout. Monthly units always show a 30 night period.
    pub fn billed_nights(&self, nights: u32) -> u32 {
        match self {
            Rate::Nightly { .. } => nights,
            Rate::Monthly { .. } => crate::pricing::MONTHLY_BILLED_NIGHTS,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoomStatus {
    Available,
    Booked,
    #[serde(rename = "Not Available")]
    Unavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub rate: Rate,
    pub status: RoomStatus,
    pub amenities: Vec<String>,
    pub image_url: String,
    #[serde(default)]
    pub gallery: Vec<String>,
    pub rating: f32,
    pub location: String,
    pub description: String,
}

impl Room {
    /// Gallery images, or the primary image when the gallery is empty.
    pub fn images(&self) -> Vec<&str> {
        if self.gallery.is_empty() {
            vec![self.image_url.as_str()]
        } else {
            self.gallery.iter().map(String::as_str).collect()
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == RoomStatus::Available
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("room id must not be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("room name must not be empty".to_string());
        }
        if self.rate.price() <= 0 {
            return Err(format!("room {} must have a positive price", self.id));
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(format!("room {} rating must be between 0 and 5", self.id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_wire_format() {
        let rate = Rate::Monthly { price_pesewas: 400_000 };
        let json = serde_json::to_value(rate).unwrap();
        assert_eq!(json, serde_json::json!({ "frequency": "month", "price_pesewas": 400_000 }));
    }

    #[test]
    fn test_unavailable_status_label() {
        let json = serde_json::to_string(&RoomStatus::Unavailable).unwrap();
        assert_eq!(json, "\"Not Available\"");
    }

    #[test]
    fn test_images_fall_back_to_primary() {
        let mut room = crate::Catalog::builtin().rooms()[0].clone();
        assert_eq!(room.images().len(), room.gallery.len());

        room.gallery.clear();
        assert_eq!(room.images(), vec![room.image_url.as_str()]);
    }

    #[test]
    fn test_validate_rejects_bad_rooms() {
        let mut room = crate::Catalog::builtin().rooms()[0].clone();
        assert!(room.validate().is_ok());

        room.rate = Rate::Nightly { price_pesewas: 0 };
        assert!(room.validate().is_err());

        room.rate = Rate::Nightly { price_pesewas: 100 };
        room.rating = 7.5;
        assert!(room.validate().is_err());
    }
}
