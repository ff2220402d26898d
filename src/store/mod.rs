//! Latest-value telemetry storage.
//!
//! The [`TelemetryStore`] trait is the narrow put-and-list-all interface the
//! ingestion path writes through. [`memory::InMemoryStore`] is always
//! available; `redis_store::RedisStore` is compiled with the `redis`
//! feature. [`connect`] picks one at startup.

pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FleetError;
use crate::telemetry::StoredTelemetry;

// async_trait is required here because the store is shared as Arc<dyn TelemetryStore>.
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    fn name(&self) -> &'static str;
    async fn put_latest(&self, drone_id: &str, record: &StoredTelemetry) -> Result<(), FleetError>;
    async fn all_latest(&self) -> Result<Vec<StoredTelemetry>, FleetError>;
}

/// Build the store for this process. A Redis URL that cannot be reached
/// falls back to the in-memory store with a warning.
pub async fn connect(redis_url: Option<&str>) -> Arc<dyn TelemetryStore> {
    #[cfg(feature = "redis")]
    if let Some(url) = redis_url {
        match redis_store::RedisStore::new(url).await {
            Ok(store) => {
                tracing::info!("using redis telemetry store");
                return Arc::new(store);
            }
            Err(e) => {
                tracing::warn!(error = %e, "redis unavailable, using in-memory telemetry store");
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    if redis_url.is_some() {
        tracing::warn!("redis support not compiled in, using in-memory telemetry store");
    }

    Arc::new(memory::InMemoryStore::new())
}
