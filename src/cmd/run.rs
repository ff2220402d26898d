//! `fleet-relay run`: start the ingestion server.
//!
//! Validates fanout settings and the partner target list before binding
//! (an invalid configuration never serves a request), connects the
//! telemetry store, and starts the Axum HTTP server with graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::cli::RunArgs;
use crate::config::model::FanoutSettings;
use crate::config::TargetsSource;
use crate::error::FleetError;
use crate::fanout::attempt::HttpDeliverer;
use crate::fanout::registry::TargetRegistry;
use crate::fanout::FanoutService;
use crate::logging;
use crate::server::{self, AppState};
use crate::store;

/// Everything `run` needs that can fail before the server starts.
pub async fn build_state(args: &RunArgs) -> Result<AppState, FleetError> {
    let settings = FanoutSettings::from_seconds(
        args.fanout_enabled,
        args.fanout_timeout_seconds,
        args.fanout_max_retries,
        args.fanout_retry_backoff_seconds,
    )?;

    let source = targets_source(args);
    let registry = TargetRegistry::load(&source).await?;

    if settings.enabled && registry.is_empty() {
        tracing::warn!("fanout enabled but no targets configured");
    }

    let deliverer = Arc::new(HttpDeliverer::new(server::build_http_client()));
    let fanout = Arc::new(FanoutService::new(settings, registry, deliverer));

    #[cfg(feature = "redis")]
    let redis_url = args.redis_url.as_deref();
    #[cfg(not(feature = "redis"))]
    let redis_url = None;
    let store = store::connect(redis_url).await;

    Ok(AppState {
        fanout,
        store,
        api_key: args.api_key.clone(),
        start_time: Instant::now(),
    })
}

#[must_use]
pub fn targets_source(args: &RunArgs) -> TargetsSource {
    args.fanout_targets_file.clone().map_or_else(
        || TargetsSource::Inline(args.fanout_targets_json.clone()),
        TargetsSource::File,
    )
}

pub async fn execute(args: RunArgs) -> Result<(), FleetError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    #[cfg(feature = "sentry-integration")]
    let _sentry_guard = args
        .sentry_dsn
        .as_ref()
        .map(|dsn| crate::sentry_integration::init(dsn, args.sentry_environment.as_deref()));

    let state = build_state(&args).await?;
    let settings = *state.fanout.settings();
    let target_count = state.fanout.registry().len();
    let store_name = state.store.name();

    let router = server::build_router(Arc::new(state), args.max_body);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        fanout_enabled = settings.enabled,
        targets = target_count,
        max_retries = settings.max_retries,
        attempts_per_target = settings.total_attempts(),
        timeout_ms = u64::try_from(settings.timeout.as_millis()).unwrap_or(u64::MAX),
        store = store_name,
        "fleet-relay started"
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(server::shutdown_signal())
    .await?;

    tracing::info!("fleet-relay stopped");
    Ok(())
}
