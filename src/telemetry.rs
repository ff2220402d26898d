//! Telemetry payload schema and validation.
//!
//! [`TelemetryIn`] is what devices POST. Serde handles shape and types
//! (unknown fields are ignored); [`TelemetryIn::validate`] enforces the
//! value ranges and the `drone_id` alphabet. The validated payload, once
//! normalized to UTC, is both what the store keeps and what partners receive.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

const fn default_schema_version() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryIn {
    #[serde(default = "default_schema_version")]
    pub schema_version: i64,
    pub drone_id: String,
    #[serde(deserialize_with = "deserialize_utc")]
    pub ts: DateTime<Utc>,
    pub position: Position,
    #[serde(default)]
    pub attitude: Option<Attitude>,
    #[serde(default)]
    pub velocity: Option<Velocity>,
    #[serde(default)]
    pub state: Option<State>,
    #[serde(default)]
    pub battery: Option<Battery>,
    #[serde(default)]
    pub link: Option<Link>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub alt_m: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Attitude {
    #[serde(default)]
    pub yaw_deg: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Velocity {
    #[serde(default)]
    pub groundspeed_mps: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct State {
    #[serde(default)]
    pub armed: Option<bool>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Battery {
    #[serde(default)]
    pub voltage_v: Option<f64>,
    #[serde(default)]
    pub remaining_pct: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Link {
    #[serde(default)]
    pub rssi_dbm: Option<i64>,
}

/// One rejected field, reported back in a 422 body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub loc: String,
    pub msg: String,
}

impl FieldError {
    fn new(loc: &str, msg: impl Into<String>) -> Self {
        Self {
            loc: loc.to_string(),
            msg: msg.into(),
        }
    }
}

/// `ts` as sent by devices: ISO 8601 text or Unix epoch seconds.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Epoch(f64),
    Text(String),
}

/// Epoch values above this are read as milliseconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 2e10;

// `as i64` saturates; out-of-range instants are rejected by chrono.
#[allow(clippy::cast_possible_truncation)]
fn parse_epoch(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let millis = if value.abs() > EPOCH_MILLIS_THRESHOLD {
        value
    } else {
        value * 1000.0
    };
    DateTime::from_timestamp_millis(millis.round() as i64)
}

/// Accepts `T` or a space between date and time. Timestamps without an
/// offset are taken to be UTC.
fn parse_text(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = match raw.as_bytes().get(10) {
        Some(b' ') => format!("{}T{}", &raw[..10], &raw[11..]),
        _ => raw.to_string(),
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn deserialize_utc<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Epoch(value) => parse_epoch(value).ok_or_else(|| {
            serde::de::Error::custom(format!("{value} is not a valid epoch timestamp"))
        }),
        RawTimestamp::Text(raw) => parse_text(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("'{raw}' is not an ISO 8601 timestamp"))
        }),
    }
}

fn check_range(
    errors: &mut Vec<FieldError>,
    loc: &str,
    value: Option<f64>,
    min: f64,
    max: f64,
) {
    if let Some(v) = value {
        if !(min..=max).contains(&v) {
            errors.push(FieldError::new(
                loc,
                format!("must be between {min} and {max}, got {v}"),
            ));
        }
    }
}

#[must_use]
pub fn is_valid_drone_id(id: &str) -> bool {
    (3..=64).contains(&id.len())
        && id
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}

impl TelemetryIn {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if !is_valid_drone_id(&self.drone_id) {
            errors.push(FieldError::new(
                "drone_id",
                "must be 3-64 characters of A-Z, 0-9, '-' or '_'",
            ));
        }

        check_range(&mut errors, "position.lat", Some(self.position.lat), -90.0, 90.0);
        check_range(&mut errors, "position.lon", Some(self.position.lon), -180.0, 180.0);
        check_range(&mut errors, "position.alt_m", self.position.alt_m, -500.0, 20_000.0);

        if let Some(pct) = self.battery.as_ref().and_then(|b| b.remaining_pct) {
            if !(0..=100).contains(&pct) {
                errors.push(FieldError::new(
                    "battery.remaining_pct",
                    format!("must be between 0 and 100, got {pct}"),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The normalized payload as a JSON object.
    pub fn to_record(&self) -> Result<serde_json::Map<String, serde_json::Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Err(serde::ser::Error::custom("telemetry did not serialize to an object")),
        }
    }
}

/// The latest record kept per drone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTelemetry {
    pub drone_id: String,
    pub last_seen_ts: DateTime<Utc>,
    pub source_ip: String,
    pub telemetry: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestTelemetryResponse {
    pub server_time: DateTime<Utc>,
    pub count: usize,
    pub drones: Vec<StoredTelemetry>,
}
