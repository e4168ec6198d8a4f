pub mod app_config;
pub mod database;
pub mod booking_repo;
pub mod profile_repo;
pub mod redis_repo;
pub mod memory;
pub mod paystack;
pub mod identity_toolkit;

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use identity_toolkit::IdentityToolkitClient;
pub use paystack::PaystackGateway;
pub use profile_repo::PgProfileRepository;
pub use redis_repo::RedisClient;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Gateway error: {0}")]
    Gateway(String),
}
