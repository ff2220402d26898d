//! HTTP handlers for the `/api/v1` surface.
//!
//! [`telemetry`] accepts device events and lists the latest record per
//! drone; [`fanout`] exposes the redacted partner list and delivery health.

pub mod fanout;
pub mod telemetry;
