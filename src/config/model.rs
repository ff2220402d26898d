//! Serde data structures for partner targets and fanout settings.
//!
//! [`TargetSpec`] is the raw, as-configured shape of one partner entry.
//! [`Target`] is the validated form produced by
//! [`validate_targets`](super::validation::validate_targets) and is the
//! only form the fanout engine ever sees.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

pub const REDACTED: &str = "***REDACTED***";

/// Header used for `auth_type = header` targets that somehow reach the
/// executor without a `header_name`.
pub const DEFAULT_HEADER_NAME: &str = "X-API-Key";

/// Keys a target entry may carry; anything else is ignored with a warning.
pub const TARGET_FIELDS: &[&str] = &[
    "name",
    "url",
    "auth_type",
    "credential",
    "api_key",
    "header_name",
];

const fn default_timeout_seconds() -> f64 {
    2.0
}

const fn default_max_retries() -> u32 {
    5
}

const fn default_backoff_seconds() -> f64 {
    2.0
}

/// One partner entry exactly as it appears in the targets JSON or YAML.
/// Keys other than these are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetSpec {
    pub name: String,

    pub url: String,

    pub auth_type: String,

    #[serde(alias = "api_key")]
    pub credential: Secret,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    Bearer,
    Header,
}

impl AuthType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bearer => "bearer",
            Self::Header => "header",
        }
    }
}

impl std::str::FromStr for AuthType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bearer" => Ok(Self::Bearer),
            "header" => Ok(Self::Header),
            other => Err(format!("'{other}' is not a supported auth type")),
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A credential that never prints itself.
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// A validated partner destination. Immutable after load.
#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    pub url: Url,
    pub auth_type: AuthType,
    pub credential: Secret,
    pub header_name: Option<String>,
}

impl Target {
    #[must_use]
    pub fn redacted(&self) -> RedactedTarget {
        RedactedTarget {
            name: self.name.clone(),
            url: self.url.to_string(),
            auth_type: self.auth_type,
            header_name: self.header_name.clone(),
            credential: REDACTED.to_string(),
        }
    }
}

/// Display-safe view of a [`Target`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedTarget {
    pub name: String,
    pub url: String,
    pub auth_type: AuthType,
    pub header_name: Option<String>,
    pub credential: String,
}

/// Runtime knobs for the fanout engine, read-only once loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanoutSettings {
    pub enabled: bool,
    /// Upper bound for a single delivery attempt.
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub retry_backoff_base: Duration,
}

impl Default for FanoutSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout: Duration::from_secs_f64(default_timeout_seconds()),
            max_retries: default_max_retries(),
            retry_backoff_base: Duration::from_secs_f64(default_backoff_seconds()),
        }
    }
}

impl FanoutSettings {
    #[must_use]
    pub const fn total_attempts(&self) -> u64 {
        self.max_retries as u64 + 1
    }
}
