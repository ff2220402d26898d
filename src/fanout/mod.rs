//! Partner fanout: deliver each accepted event to every configured target.
//!
//! [`FanoutService`] is the coordinator. For each event it starts one
//! [`RetryController`](retry::RetryController) run per target on a
//! [`JoinSet`] and waits for all of them, so a slow or failing partner never
//! holds up another. Ingestion calls [`FanoutService::deliver_event`], which
//! launches that work detached from the request.
//!
//! Submodules: [`registry`] (validated targets), [`attempt`] (one HTTP POST),
//! [`retry`] (backoff state machine), [`outcomes`] (last failure per target).

pub mod attempt;
pub mod outcomes;
pub mod registry;
pub mod retry;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::task::{JoinHandle, JoinSet};
use uuid::Uuid;

use crate::config::model::{FanoutSettings, RedactedTarget, Target};
use crate::error::DeliveryError;
use outcomes::{LastErrors, LastFailure};
use registry::TargetRegistry;
use retry::RetryController;

/// Performs one delivery attempt of `payload` to `target`.
// async_trait: the deliverer is shared as Arc<dyn Deliver>.
#[async_trait]
pub trait Deliver: Send + Sync {
    async fn attempt(
        &self,
        target: &Target,
        payload: &EventPayload,
        timeout: Duration,
    ) -> Result<(), DeliveryError>;
}

/// An accepted event, serialized once and shared by every target's run.
#[derive(Debug, Clone)]
pub struct EventPayload {
    id: Uuid,
    body: Bytes,
}

impl EventPayload {
    #[must_use]
    pub fn new(record: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            body: Bytes::from(serde_json::Value::Object(record).to_string()),
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The JSON body sent to partners.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanoutHealth {
    pub status: String,
    pub enabled: bool,
    pub target_names: Vec<String>,
    pub last_errors: BTreeMap<String, String>,
}

/// Per-event totals across all targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutSummary {
    pub delivered: usize,
    pub exhausted: usize,
    pub attempts: u64,
}

pub struct FanoutService {
    settings: FanoutSettings,
    registry: TargetRegistry,
    last_errors: Arc<LastErrors>,
    controller: RetryController,
}

impl FanoutService {
    #[must_use]
    pub fn new(
        settings: FanoutSettings,
        registry: TargetRegistry,
        deliverer: Arc<dyn Deliver>,
    ) -> Self {
        let last_errors = Arc::new(LastErrors::new());
        let controller = RetryController::new(deliverer, Arc::clone(&last_errors), settings);
        Self {
            settings,
            registry,
            last_errors,
            controller,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &FanoutSettings {
        &self.settings
    }

    #[must_use]
    pub const fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    /// Deliver `payload` to every target and return once all runs finish.
    pub async fn fanout(&self, payload: EventPayload) -> FanoutSummary {
        if !self.settings.enabled || self.registry.is_empty() {
            tracing::debug!(
                event_id = %payload.id(),
                enabled = self.settings.enabled,
                targets = self.registry.len(),
                "fanout skipped"
            );
            return FanoutSummary::default();
        }

        let mut tasks = JoinSet::new();
        for target in self.registry.targets() {
            let controller = self.controller.clone();
            let target = target.clone();
            let payload = payload.clone();
            tasks.spawn(async move { controller.run(&target, &payload).await });
        }

        let mut summary = FanoutSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    summary.attempts += u64::from(outcome.attempts());
                    if outcome.is_success() {
                        summary.delivered += 1;
                    } else {
                        summary.exhausted += 1;
                    }
                }
                Err(join_err) => {
                    tracing::error!(
                        event_id = %payload.id(),
                        error = %join_err,
                        "fanout task panicked"
                    );
                }
            }
        }

        tracing::info!(
            event_id = %payload.id(),
            delivered = summary.delivered,
            exhausted = summary.exhausted,
            attempts = summary.attempts,
            "fanout complete"
        );
        summary
    }

    /// Launch [`fanout`](Self::fanout) without waiting for it.
    ///
    /// Dropping the returned handle leaves the work running.
    pub fn deliver_event(self: &Arc<Self>, payload: EventPayload) -> JoinHandle<FanoutSummary> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.fanout(payload).await })
    }

    #[must_use]
    pub fn redacted_targets(&self) -> Vec<RedactedTarget> {
        self.registry.redacted_view()
    }

    pub async fn health(&self) -> FanoutHealth {
        FanoutHealth {
            status: "ok".to_string(),
            enabled: self.settings.enabled,
            target_names: self.registry.names(),
            last_errors: self.last_errors.timestamps().await,
        }
    }

    pub async fn last_failure(&self, target: &str) -> Option<LastFailure> {
        self.last_errors.get(target).await
    }
}
