//! Unified error types for fleet-relay.
//!
//! [`FleetError`] is the crate-level error returned from startup and CLI
//! paths, [`ValidationError`] describes a single problem found in the
//! partner target list, and [`DeliveryError`] classifies why one delivery
//! attempt to a partner failed. Error messages include contextual hints to
//! guide the operator toward a fix.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub target: String,
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "  target {}: {}: {}",
            self.target, self.field, self.message
        )?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FleetError {
    #[error("Targets file not found: {}", path.display())]
    TargetsFileNotFound { path: PathBuf },

    #[error("Targets parse error in {source_label}:\n  {source}")]
    ConfigParse {
        source_label: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Targets in {source_label} must be a JSON list, found {found}")]
    TargetsNotList {
        source_label: String,
        found: &'static str,
    },

    #[error("Target validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Invalid setting {name}: {message}")]
    InvalidSetting { name: &'static str, message: String },

    #[error("Unsupported targets format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),

    #[error("Store error ({backend}): {source}")]
    #[cfg(feature = "redis")]
    Store {
        backend: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Why a single delivery attempt to a partner did not succeed.
///
/// Every variant is recoverable by the retry controller; none of them ever
/// reaches the ingestion caller.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum DeliveryError {
    #[error("partner responded with HTTP {status}")]
    Status { status: hyper::StatusCode },

    #[error("request timed out after {}ms", timeout.as_millis())]
    Timeout { timeout: Duration },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("could not build request: {message}")]
    Request { message: String },
}

impl DeliveryError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }
}
