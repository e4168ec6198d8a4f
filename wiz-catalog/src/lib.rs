pub mod room;
pub mod pricing;
pub mod inventory;

pub use inventory::{Catalog, CatalogError, InventoryEditor, InventoryStats};
pub use pricing::{default_stay, nights, parse_date, quote, PricingError, Quote};
pub use room::{Rate, Room, RoomStatus};
