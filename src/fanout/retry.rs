//! Per-target retry with exponential backoff.
//!
//! One [`RetryController::run`] drives a single (target, event) delivery
//! through an explicit state machine:
//!
//! ```text
//! Attempting(n) ──ok──▶ Succeeded
//!      │
//!     err
//!      ▼
//!  Failed(n) ──n >= max_retries──▶ Exhausted
//!      │
//!  sleep(base * 2^n)
//!      ▼
//! Attempting(n + 1)
//! ```
//!
//! Failures are recorded in the shared [`LastErrors`] map and logged;
//! exhaustion is terminal for the run but is never raised to the caller.

use std::sync::Arc;
use std::time::Duration;

use super::outcomes::LastErrors;
use super::{Deliver, EventPayload};
use crate::config::model::{FanoutSettings, Target};
use crate::error::DeliveryError;

/// Delay inserted after failed attempt `attempt_index` (0-based):
/// `base * 2^attempt_index`, saturating at `Duration::MAX`.
#[must_use]
pub fn backoff_delay(base: Duration, attempt_index: u32) -> Duration {
    if base.is_zero() {
        return Duration::ZERO;
    }
    2_u32
        .checked_pow(attempt_index)
        .and_then(|factor| base.checked_mul(factor))
        .unwrap_or(Duration::MAX)
}

#[derive(Debug)]
enum RetryState {
    Attempting(u32),
    Failed { attempt: u32, error: DeliveryError },
    Succeeded { attempts: u32 },
    Exhausted { attempts: u32, last_error: DeliveryError },
}

/// Terminal result of one target's run.
#[derive(Debug, Clone)]
pub enum RetryOutcome {
    Succeeded { attempts: u32 },
    Exhausted { attempts: u32, last_error: DeliveryError },
}

impl RetryOutcome {
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

#[derive(Clone)]
pub struct RetryController {
    deliverer: Arc<dyn Deliver>,
    last_errors: Arc<LastErrors>,
    settings: FanoutSettings,
}

impl RetryController {
    #[must_use]
    pub fn new(
        deliverer: Arc<dyn Deliver>,
        last_errors: Arc<LastErrors>,
        settings: FanoutSettings,
    ) -> Self {
        Self {
            deliverer,
            last_errors,
            settings,
        }
    }

    pub async fn run(&self, target: &Target, payload: &EventPayload) -> RetryOutcome {
        let mut state = RetryState::Attempting(0);

        loop {
            state = match state {
                RetryState::Attempting(attempt) => self.attempt(target, payload, attempt).await,

                RetryState::Failed { attempt, error } if attempt >= self.settings.max_retries => {
                    let attempts = attempt.saturating_add(1);
                    tracing::warn!(
                        event_id = %payload.id(),
                        target = %target.name,
                        attempts,
                        error = %error,
                        "fanout retries exhausted"
                    );
                    RetryState::Exhausted {
                        attempts,
                        last_error: error,
                    }
                }

                RetryState::Failed { attempt, .. } => {
                    let delay = backoff_delay(self.settings.retry_backoff_base, attempt);
                    if !delay.is_zero() {
                        tracing::debug!(
                            event_id = %payload.id(),
                            target = %target.name,
                            attempt = attempt + 1,
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            "backing off before retry"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    RetryState::Attempting(attempt + 1)
                }

                RetryState::Succeeded { attempts } => {
                    return RetryOutcome::Succeeded { attempts };
                }

                RetryState::Exhausted {
                    attempts,
                    last_error,
                } => {
                    return RetryOutcome::Exhausted {
                        attempts,
                        last_error,
                    };
                }
            };
        }
    }

    async fn attempt(&self, target: &Target, payload: &EventPayload, attempt: u32) -> RetryState {
        match self
            .deliverer
            .attempt(target, payload, self.settings.timeout)
            .await
        {
            Ok(()) => {
                self.last_errors.clear(&target.name).await;
                tracing::info!(
                    event_id = %payload.id(),
                    target = %target.name,
                    attempt = attempt.saturating_add(1),
                    "fanout delivered"
                );
                RetryState::Succeeded {
                    attempts: attempt.saturating_add(1),
                }
            }
            Err(error) => {
                self.last_errors.record(&target.name, &error).await;
                tracing::warn!(
                    event_id = %payload.id(),
                    target = %target.name,
                    attempt = attempt.saturating_add(1),
                    error = %error,
                    "fanout attempt failed"
                );
                RetryState::Failed { attempt, error }
            }
        }
    }
}
