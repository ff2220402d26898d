//! Optional Sentry error tracking integration.
//!
//! Initializes the Sentry SDK with the provided DSN and environment. The
//! returned guard must be held for the lifetime of the server so that
//! panics and forwarded `tracing` errors are flushed. Events are tagged
//! with the service name so partner-delivery failures can be filtered.

pub fn init(dsn: &str, environment: Option<&str>) -> sentry::ClientInitGuard {
    let parsed_dsn = match dsn.parse() {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::warn!(error = %e, "invalid Sentry DSN, error tracking disabled");
            None
        }
    };

    let guard = sentry::init(sentry::ClientOptions {
        dsn: parsed_dsn,
        environment: environment.map(|e| e.to_string().into()),
        release: Some(concat!(env!("CARGO_PKG_NAME"), "@", env!("CARGO_PKG_VERSION")).into()),
        ..Default::default()
    });
    sentry::configure_scope(|scope| scope.set_tag("service", env!("CARGO_PKG_NAME")));
    guard
}
