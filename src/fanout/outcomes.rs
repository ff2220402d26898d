//! Most recent delivery failure per partner target.
//!
//! Written by concurrently running retry controllers, read by the fanout
//! health endpoint. Each entry is overwritten by the next failure for the
//! same target and removed by the next success; concurrent fanout calls for
//! the same target resolve last-write-wins.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::sync::RwLock;

use crate::error::DeliveryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastFailure {
    pub at: DateTime<Utc>,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct LastErrors {
    entries: RwLock<HashMap<String, LastFailure>>,
}

impl LastErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, target: &str, error: &DeliveryError) {
        let failure = LastFailure {
            at: Utc::now(),
            error: error.to_string(),
        };
        self.entries
            .write()
            .await
            .insert(target.to_string(), failure);
    }

    pub async fn clear(&self, target: &str) {
        self.entries.write().await.remove(target);
    }

    pub async fn get(&self, target: &str) -> Option<LastFailure> {
        self.entries.read().await.get(target).cloned()
    }

    /// Target name to RFC 3339 failure timestamp, sorted by name.
    pub async fn timestamps(&self) -> BTreeMap<String, String> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(name, failure)| {
                (
                    name.clone(),
                    failure.at.to_rfc3339_opts(SecondsFormat::Micros, true),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_overwrites_and_clear_removes() {
        let errors = LastErrors::new();
        errors.record("B", &DeliveryError::network("refused")).await;
        let first = errors.get("B").await.unwrap();
        assert_eq!(first.error, "network error: refused");

        errors
            .record(
                "B",
                &DeliveryError::Status {
                    status: hyper::StatusCode::BAD_GATEWAY,
                },
            )
            .await;
        let second = errors.get("B").await.unwrap();
        assert!(second.error.contains("502"));
        assert!(second.at >= first.at);

        errors.clear("B").await;
        assert!(errors.get("B").await.is_none());
        assert!(errors.timestamps().await.is_empty());
    }

    #[tokio::test]
    async fn timestamps_are_rfc3339_utc() {
        let errors = LastErrors::new();
        errors.record("A", &DeliveryError::network("reset")).await;
        let stamps = errors.timestamps().await;
        let stamp = stamps.get("A").unwrap();
        assert!(stamp.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[tokio::test]
    async fn clearing_unknown_target_is_a_no_op() {
        let errors = LastErrors::new();
        errors.clear("nobody").await;
        assert!(errors.timestamps().await.is_empty());
    }
}
