use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::info;
use wiz_core::{BoxError, ClientId, FlagKey, FlagStore};

/// Local persistent flags kept in Redis, one key per browser and flag.
/// Keys carry no TTL.
#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    fn flag_key(client: &ClientId, key: FlagKey) -> String {
        format!("flags:{}:{}", client, key.as_str())
    }
}

#[async_trait]
impl FlagStore for RedisClient {
    async fn get_flag(&self, client: &ClientId, key: FlagKey) -> Result<Option<String>, BoxError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(Self::flag_key(client, key)).await?;
        Ok(value)
    }

    async fn set_flag(&self, client: &ClientId, key: FlagKey, value: &str) -> Result<(), BoxError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(Self::flag_key(client, key), value).await?;
        info!("Flag {} set for {}", key.as_str(), client);
        Ok(())
    }

    async fn clear_flag(&self, client: &ClientId, key: FlagKey) -> Result<(), BoxError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(Self::flag_key(client, key)).await?;
        info!("Flag {} cleared for {}", key.as_str(), client);
        Ok(())
    }
}
