//! Process-local [`TelemetryStore`](super::TelemetryStore).

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::TelemetryStore;
use crate::error::FleetError;
use crate::telemetry::StoredTelemetry;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    items: RwLock<HashMap<String, StoredTelemetry>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TelemetryStore for InMemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn put_latest(&self, drone_id: &str, record: &StoredTelemetry) -> Result<(), FleetError> {
        self.items
            .write()
            .await
            .insert(drone_id.to_string(), record.clone());
        Ok(())
    }

    async fn all_latest(&self) -> Result<Vec<StoredTelemetry>, FleetError> {
        Ok(self.items.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(drone_id: &str, ip: &str) -> StoredTelemetry {
        StoredTelemetry {
            drone_id: drone_id.into(),
            last_seen_ts: Utc::now(),
            source_ip: ip.into(),
            telemetry: serde_json::json!({"drone_id": drone_id}),
        }
    }

    #[tokio::test]
    async fn keeps_only_latest_per_drone() {
        let store = InMemoryStore::new();
        store.put_latest("WX-1", &record("WX-1", "10.0.0.1")).await.unwrap();
        store.put_latest("WX-2", &record("WX-2", "10.0.0.2")).await.unwrap();
        store.put_latest("WX-1", &record("WX-1", "10.0.0.3")).await.unwrap();

        let mut all = store.all_latest().await.unwrap();
        all.sort_by(|a, b| a.drone_id.cmp(&b.drone_id));
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].source_ip, "10.0.0.3");
        assert_eq!(all[1].drone_id, "WX-2");
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        assert!(InMemoryStore::new().all_latest().await.unwrap().is_empty());
    }
}
