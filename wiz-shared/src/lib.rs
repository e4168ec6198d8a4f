pub mod pii;
pub mod money;

pub use money::{Currency, cedis_to_pesewas, format_cedis};
pub use pii::Masked;
