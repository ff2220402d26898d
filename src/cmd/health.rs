//! `fleet-relay health`: show partner delivery health of a running instance.
//!
//! Sends a `GET /api/v1/fanout/health` request to the specified URL and
//! displays the response as formatted text or raw JSON.

use std::fmt::Write;

use http_body_util::BodyExt;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::cli::HealthArgs;
use crate::error::FleetError;
use crate::fanout::FanoutHealth;

pub async fn execute(args: HealthArgs) -> Result<(), FleetError> {
    let url = format!("{}/api/v1/fanout/health", args.url.trim_end_matches('/'));
    let uri: hyper::Uri = url
        .parse()
        .map_err(|e: hyper::http::uri::InvalidUri| FleetError::UriParse {
            source: Box::new(e),
        })?;

    let connector = hyper_util::client::legacy::connect::HttpConnector::new();
    let client = Client::builder(TokioExecutor::new()).build(connector);

    let req = hyper::Request::builder()
        .uri(uri)
        .body(http_body_util::Full::new(bytes::Bytes::new()))
        .map_err(|e| FleetError::HttpRequest {
            source: Box::new(e),
        })?;

    let response = tokio::time::timeout(std::time::Duration::from_secs(10), client.request(req))
        .await
        .map_err(|_| FleetError::HttpRequest {
            source: "health check timed out after 10s".into(),
        })?
        .map_err(|e| FleetError::HttpRequest {
            source: Box::new(e),
        })?;

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| FleetError::HttpRequest {
            source: Box::new(e),
        })?
        .to_bytes();

    if !status.is_success() {
        return Err(FleetError::HealthCheckFailed(status));
    }

    if args.json {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    match serde_json::from_slice::<FanoutHealth>(&body) {
        Ok(health) => print!("{}", render(&args.url, &health)),
        Err(e) => {
            eprintln!("Failed to parse health response: {e}");
            println!("{}", String::from_utf8_lossy(&body));
        }
    }

    Ok(())
}

fn render(url: &str, health: &FanoutHealth) -> String {
    let mode = if health.enabled { "enabled" } else { "disabled" };
    let mut out = String::new();
    let _ = writeln!(out, "\u{2713} fleet-relay fanout is {mode} ({url})");
    let _ = writeln!(out, "  targets:  {}", health.target_names.len());

    for name in &health.target_names {
        let _ = match health.last_errors.get(name) {
            Some(at) => writeln!(out, "    {name}  last failure at {at}"),
            None => writeln!(out, "    {name}  ok"),
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn render_marks_failing_targets() {
        let health = FanoutHealth {
            status: "ok".into(),
            enabled: true,
            target_names: vec!["A".into(), "B".into()],
            last_errors: BTreeMap::from([("B".to_string(), "2026-01-01T00:00:00.000000Z".to_string())]),
        };
        let text = render("http://localhost:8000", &health);
        assert!(text.contains("fanout is enabled"));
        assert!(text.contains("A  ok"));
        assert!(text.contains("B  last failure at 2026-01-01T00:00:00.000000Z"));
    }

    #[test]
    fn render_disabled_without_targets() {
        let health = FanoutHealth {
            status: "ok".into(),
            enabled: false,
            target_names: Vec::new(),
            last_errors: BTreeMap::new(),
        };
        let text = render("http://x", &health);
        assert!(text.contains("fanout is disabled"));
        assert!(text.contains("targets:  0"));
    }
}
