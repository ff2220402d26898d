//! Startup configuration: fanout settings and the partner target list.
//!
//! Settings arrive as CLI flags or environment variables (see
//! [`cli::RunArgs`](crate::cli::RunArgs)) and are checked by
//! [`FanoutSettings::from_seconds`]. The target list is read from a
//! [`TargetsSource`] and validated into a
//! [`TargetRegistry`](crate::fanout::registry::TargetRegistry). Both are
//! loaded once and never reloaded.

pub mod model;
pub mod sources;
pub mod validation;

use std::time::Duration;

use crate::error::FleetError;
use model::FanoutSettings;
pub use sources::TargetsSource;

impl FanoutSettings {
    /// Build settings from the second-based values used on the command line.
    pub fn from_seconds(
        enabled: bool,
        timeout_seconds: f64,
        max_retries: u32,
        retry_backoff_seconds: f64,
    ) -> Result<Self, FleetError> {
        if !timeout_seconds.is_finite() || timeout_seconds <= 0.0 {
            return Err(FleetError::InvalidSetting {
                name: "fanout timeout",
                message: format!("must be a positive number of seconds, got {timeout_seconds}"),
            });
        }
        if !retry_backoff_seconds.is_finite() || retry_backoff_seconds < 0.0 {
            return Err(FleetError::InvalidSetting {
                name: "fanout retry backoff",
                message: format!(
                    "must be zero or a positive number of seconds, got {retry_backoff_seconds}"
                ),
            });
        }

        let timeout = Duration::try_from_secs_f64(timeout_seconds).map_err(|e| {
            FleetError::InvalidSetting {
                name: "fanout timeout",
                message: e.to_string(),
            }
        })?;
        let retry_backoff_base = Duration::try_from_secs_f64(retry_backoff_seconds).map_err(|e| {
            FleetError::InvalidSetting {
                name: "fanout retry backoff",
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            enabled,
            timeout,
            max_retries,
            retry_backoff_base,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_fractional_seconds() {
        let settings = FanoutSettings::from_seconds(true, 0.25, 2, 0.0).unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.timeout, Duration::from_millis(250));
        assert_eq!(settings.max_retries, 2);
        assert_eq!(settings.retry_backoff_base, Duration::ZERO);
    }

    #[test]
    fn rejects_non_positive_timeout() {
        assert!(FanoutSettings::from_seconds(true, 0.0, 0, 1.0).is_err());
        assert!(FanoutSettings::from_seconds(true, -1.0, 0, 1.0).is_err());
        assert!(FanoutSettings::from_seconds(true, f64::NAN, 0, 1.0).is_err());
    }

    #[test]
    fn rejects_negative_or_infinite_backoff() {
        assert!(FanoutSettings::from_seconds(true, 1.0, 0, -0.5).is_err());
        assert!(FanoutSettings::from_seconds(true, 1.0, 0, f64::INFINITY).is_err());
    }
}
