use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client, RedisError};

use crate::waitlist::domain::WaitlistEntry;
use crate::waitlist::repository::{log_key, EntryKey, StoreError, WaitlistStore};

const MAX_RECONNECT_DELAY_MS: u64 = 2_000;

/// Keyed remote store: one hash per entry plus a JSON list as the audit log.
///
/// The connection manager is opened once and cloned per command; clones share
/// the underlying multiplexed connection.
#[derive(Clone)]
pub struct RedisWaitlistStore {
    connection: ConnectionManager,
    log_key: String,
}

impl RedisWaitlistStore {
    pub async fn connect(redis_url: &str, namespace: &str) -> Result<Self, StoreError> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(2)
            .set_max_delay(MAX_RECONNECT_DELAY_MS);

        let client = Client::open(redis_url).map_err(unavailable)?;
        let connection = client
            .get_connection_manager_with_config(config)
            .await
            .map_err(unavailable)?;

        Ok(Self::with_connection(connection, namespace))
    }

    pub fn with_connection(connection: ConnectionManager, namespace: &str) -> Self {
        Self {
            connection,
            log_key: log_key(namespace),
        }
    }
}

fn unavailable(error: RedisError) -> StoreError {
    StoreError::Unavailable(error.to_string())
}

#[async_trait]
impl WaitlistStore for RedisWaitlistStore {
    async fn upsert(&self, key: &EntryKey, entry: &WaitlistEntry) -> Result<(), StoreError> {
        let fields = entry.to_fields();
        let mut connection = self.connection.clone();
        // Replace the whole hash so fields absent from the new entry do not linger.
        let () = redis::pipe()
            .atomic()
            .del(key.as_str())
            .ignore()
            .hset_multiple(key.as_str(), fields.as_slice())
            .ignore()
            .query_async(&mut connection)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn append_to_log(&self, entry: &WaitlistEntry) -> Result<(), StoreError> {
        let payload = serde_json::to_string(entry)?;
        let mut connection = self.connection.clone();
        connection
            .lpush::<_, _, ()>(&self.log_key, payload)
            .await
            .map_err(unavailable)
    }

    async fn fetch(&self, key: &EntryKey) -> Result<Option<WaitlistEntry>, StoreError> {
        let mut connection = self.connection.clone();
        let fields: HashMap<String, String> = connection
            .hgetall(key.as_str())
            .await
            .map_err(unavailable)?;

        if fields.is_empty() {
            return Ok(None);
        }

        WaitlistEntry::from_fields(&fields)
            .map(Some)
            .map_err(|error| StoreError::Serialization(format!("{key}: {error}")))
    }

    async fn log(&self) -> Result<Vec<WaitlistEntry>, StoreError> {
        let mut connection = self.connection.clone();
        let raw: Vec<String> = connection
            .lrange(&self.log_key, 0, -1)
            .await
            .map_err(unavailable)?;

        // LPUSH keeps the newest record at the head.
        raw.iter()
            .rev()
            .map(|payload| serde_json::from_str(payload).map_err(StoreError::from))
            .collect()
    }
}
