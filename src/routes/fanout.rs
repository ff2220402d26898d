//! Read-only views of the partner fanout engine.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::config::model::RedactedTarget;
use crate::fanout::FanoutHealth;
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct TargetsResponse {
    pub fanout_enabled: bool,
    pub targets: Vec<RedactedTarget>,
}

pub async fn targets_handler(State(state): State<Arc<AppState>>) -> Json<TargetsResponse> {
    Json(TargetsResponse {
        fanout_enabled: state.fanout.settings().enabled,
        targets: state.fanout.redacted_targets(),
    })
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<FanoutHealth> {
    Json(state.fanout.health().await)
}
