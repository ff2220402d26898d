//! Redis-backed [`TelemetryStore`](super::TelemetryStore).
//!
//! Each drone's latest record is a JSON string under `latest:{drone_id}`,
//! written and read over a multiplexed Tokio connection.

use async_trait::async_trait;
use redis::AsyncCommands;

use super::TelemetryStore;
use crate::error::FleetError;
use crate::telemetry::StoredTelemetry;

const KEY_PREFIX: &str = "latest:";

fn store_error(e: impl std::error::Error + Send + Sync + 'static) -> FleetError {
    FleetError::Store {
        backend: "redis",
        source: Box::new(e),
    }
}

pub struct RedisStore {
    connection: redis::aio::MultiplexedConnection,
}

impl RedisStore {
    pub async fn new(url: &str) -> Result<Self, FleetError> {
        let client = redis::Client::open(url).map_err(store_error)?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(store_error)?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl TelemetryStore for RedisStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn put_latest(&self, drone_id: &str, record: &StoredTelemetry) -> Result<(), FleetError> {
        let value = serde_json::to_string(record).map_err(store_error)?;
        let mut conn = self.connection.clone();
        conn.set::<_, _, ()>(format!("{KEY_PREFIX}{drone_id}"), value)
            .await
            .map_err(store_error)
    }

    async fn all_latest(&self) -> Result<Vec<StoredTelemetry>, FleetError> {
        let mut conn = self.connection.clone();
        let keys: Vec<String> = conn
            .keys(format!("{KEY_PREFIX}*"))
            .await
            .map_err(store_error)?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await
            .map_err(store_error)?;

        let mut records = Vec::with_capacity(values.len());
        for value in values.into_iter().flatten() {
            match serde_json::from_str::<StoredTelemetry>(&value) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(error = %e, "skipping unreadable telemetry record"),
            }
        }
        Ok(records)
    }
}
