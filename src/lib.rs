//! Fleet-relay ingests drone telemetry and fans each accepted event out to
//! partner systems.
//!
//! Devices post telemetry to the ingestion endpoint; the latest record per
//! drone is kept in a store, and, when fanout is enabled, the same record is
//! delivered to every configured partner target concurrently. Each partner
//! gets its own retry loop with exponential backoff, and failures are
//! recorded per target without ever affecting the ingestion response.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, validate, health).
//! - [`config`] -- Fanout settings, partner target loading, and validation.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`fanout`] -- Target registry, delivery attempts, retry controller, and
//!   the fanout coordinator.
//! - [`health`] -- `GET /healthz` liveness handler.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`routes`] -- Telemetry ingestion and fanout introspection handlers.
//! - [`server`] -- Axum server setup, shared application state, HTTP client, and
//!   graceful shutdown.
//! - [`store`] -- Latest-telemetry storage behind the
//!   [`TelemetryStore`](store::TelemetryStore) trait.
//! - [`telemetry`] -- Telemetry wire model and field validation.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML targets file support _(enabled by default)_ |
//! | `redis` | Redis latest-telemetry store |
//! | `sentry-integration` | Sentry error tracking |
//! | `full` | All features |

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod fanout;
pub mod health;
pub mod logging;
pub mod routes;
pub mod server;
pub mod store;
pub mod telemetry;

#[cfg(feature = "sentry-integration")]
pub mod sentry_integration;
