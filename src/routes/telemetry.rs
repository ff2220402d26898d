//! Telemetry ingestion and latest-value listing.
//!
//! [`ingest_handler`] checks the API key, validates the payload, records it
//! as the drone's latest value, then hands it to the fanout engine without
//! waiting. Its response never depends on partner delivery.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::fanout::EventPayload;
use crate::server::AppState;
use crate::telemetry::{FieldError, LatestTelemetryResponse, StoredTelemetry, TelemetryIn};

pub const API_KEY_HEADER: &str = "x-api-key";

fn unprocessable(detail: &[FieldError]) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "detail": detail })),
    )
        .into_response()
}

pub async fn ingest_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<Json<TelemetryIn>, JsonRejection>,
) -> Response {
    let presented = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if presented != state.api_key {
        tracing::warn!(client_ip = %addr.ip(), "telemetry rejected: bad api key");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Unauthorized" })),
        )
            .into_response();
    }

    let telemetry = match payload {
        Ok(Json(telemetry)) => telemetry,
        Err(rejection) => {
            let status = match rejection {
                JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ref other => other.status(),
            };
            return (
                status,
                Json(json!({
                    "detail": [{ "loc": "body", "msg": rejection.body_text() }]
                })),
            )
                .into_response();
        }
    };

    if let Err(errors) = telemetry.validate() {
        return unprocessable(&errors);
    }

    let record = match telemetry.to_record() {
        Ok(record) => record,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize telemetry");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let stored = StoredTelemetry {
        drone_id: telemetry.drone_id.clone(),
        last_seen_ts: Utc::now(),
        source_ip: addr.ip().to_string(),
        telemetry: serde_json::Value::Object(record.clone()),
    };

    if let Err(e) = state.store.put_latest(&telemetry.drone_id, &stored).await {
        tracing::error!(
            drone_id = %telemetry.drone_id,
            store = state.store.name(),
            error = %e,
            "failed to store telemetry"
        );
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let event = EventPayload::new(record);
    tracing::info!(
        event_id = %event.id(),
        drone_id = %telemetry.drone_id,
        "telemetry accepted"
    );
    // Detached: partner latency and failures never reach this response.
    drop(state.fanout.deliver_event(event));

    (StatusCode::OK, Json(json!({ "status": "accepted" }))).into_response()
}

pub async fn latest_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.store.all_latest().await {
        Ok(mut drones) => {
            drones.sort_by(|a, b| a.drone_id.cmp(&b.drone_id));
            Json(LatestTelemetryResponse {
                server_time: Utc::now(),
                count: drones.len(),
                drones,
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!(store = state.store.name(), error = %e, "failed to list telemetry");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
