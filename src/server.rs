//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the fanout
//! service, telemetry store, ingestion API key, and uptime),
//! [`build_router`] for constructing the Axum router with middleware
//! layers, [`build_http_client`] for the connection-pooled hyper client
//! used for partner delivery, and [`shutdown_signal`] for SIGTERM /
//! Ctrl+C handling.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::routing::{get, post};
use axum::Router;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::fanout::FanoutService;
use crate::health::health_handler;
use crate::routes;
use crate::store::TelemetryStore;

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
pub type HttpClient = Client<HttpsConnector, http_body_util::Full<bytes::Bytes>>;

pub struct AppState {
    pub fanout: Arc<FanoutService>,
    pub store: Arc<dyn TelemetryStore>,
    pub api_key: String,
    pub start_time: Instant,
}

#[must_use]
pub fn build_http_client() -> HttpClient {
    // When multiple rustls crypto providers are compiled in (e.g. `--all-features`
    // pulls in `aws-lc-rs` through sentry), rustls cannot auto-detect which one
    // to use. Explicitly install `ring` as the default provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30))
        .build(https)
}

pub fn build_router(state: Arc<AppState>, max_body: usize) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/api/v1/telemetry", post(routes::telemetry::ingest_handler))
        .route(
            "/api/v1/telemetry/latest",
            get(routes::telemetry::latest_handler),
        )
        .route(
            "/api/v1/fanout/targets",
            get(routes::fanout::targets_handler),
        )
        .route("/api/v1/fanout/health", get(routes::fanout::health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body)),
        )
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
