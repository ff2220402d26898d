//! A single timed delivery attempt to one partner.
//!
//! [`HttpDeliverer`] is the production [`Deliver`] implementation: it builds
//! the JSON and auth headers for the target, issues exactly one POST through
//! the shared connection-pooled client, and classifies the result. Retrying
//! is the caller's job.

use std::time::Duration;

use async_trait::async_trait;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use http_body_util::{BodyExt, Full};

use super::{Deliver, EventPayload};
use crate::config::model::{AuthType, Target, DEFAULT_HEADER_NAME};
use crate::error::DeliveryError;
use crate::server::HttpClient;

/// Derive the one auth header a target sends.
pub fn auth_header(target: &Target) -> Result<(HeaderName, HeaderValue), DeliveryError> {
    let credential = target.credential.expose();
    let (name, value) = match target.auth_type {
        AuthType::Bearer => (
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {credential}")),
        ),
        AuthType::Header => {
            // Unreachable with a validated registry, which requires header_name.
            let raw_name = target.header_name.as_deref().unwrap_or(DEFAULT_HEADER_NAME);
            let name = raw_name.parse::<HeaderName>().map_err(|_| {
                DeliveryError::request(format!("invalid auth header name '{raw_name}'"))
            })?;
            (name, HeaderValue::from_str(credential))
        }
    };

    let mut value = value
        .map_err(|_| DeliveryError::request("credential is not a valid header value"))?;
    value.set_sensitive(true);
    Ok((name, value))
}

pub fn build_headers(target: &Target) -> Result<HeaderMap, DeliveryError> {
    let mut headers = HeaderMap::with_capacity(2);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let (name, value) = auth_header(target)?;
    headers.insert(name, value);
    Ok(headers)
}

/// Flatten an error and its sources into one line; hyper's top-level
/// client errors alone say little ("client error (Connect)").
fn describe(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[derive(Clone)]
pub struct HttpDeliverer {
    client: HttpClient,
}

impl HttpDeliverer {
    #[must_use]
    pub const fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Deliver for HttpDeliverer {
    async fn attempt(
        &self,
        target: &Target,
        payload: &EventPayload,
        timeout: Duration,
    ) -> Result<(), DeliveryError> {
        let headers = build_headers(target)?;

        let mut req_builder = hyper::Request::builder()
            .method(Method::POST)
            .uri(target.url.as_str());
        for (key, value) in &headers {
            req_builder = req_builder.header(key, value);
        }
        let request = req_builder
            .body(Full::new(payload.body().clone()))
            .map_err(|e| DeliveryError::request(e.to_string()))?;

        let exchange = async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|e| DeliveryError::network(describe(&e)))?;
            let status = response.status();
            // Drain the body so the pooled connection can be reused.
            if let Err(e) = response.into_body().collect().await {
                tracing::debug!(target = %target.name, error = %e, "failed to drain partner response body");
            }
            if status.is_success() {
                Ok(())
            } else {
                Err(DeliveryError::Status { status })
            }
        };

        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| DeliveryError::Timeout { timeout })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::Secret;

    fn target(auth_type: AuthType, header_name: Option<&str>) -> Target {
        Target {
            name: "partner".into(),
            url: url::Url::parse("https://partner.example.com/ingest").unwrap(),
            auth_type,
            credential: Secret::new("tok-1"),
            header_name: header_name.map(Into::into),
        }
    }

    #[test]
    fn bearer_sets_authorization_only() {
        let headers = build_headers(&target(AuthType::Bearer, None)).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok-1");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(headers.get("x-api-key").is_none());
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn bearer_ignores_configured_header_name() {
        let headers = build_headers(&target(AuthType::Bearer, Some("X-Partner-Key"))).unwrap();
        assert!(headers.get("x-partner-key").is_none());
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok-1");
    }

    #[test]
    fn header_sets_custom_header_only() {
        let headers = build_headers(&target(AuthType::Header, Some("X-Partner-Key"))).unwrap();
        assert_eq!(headers.get("X-Partner-Key").unwrap(), "tok-1");
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers.len(), 2);
    }

    // A validated registry never produces a header target without a name;
    // this only pins the fallback should that invariant ever break.
    #[test]
    fn header_without_name_falls_back_to_x_api_key() {
        let headers = build_headers(&target(AuthType::Header, None)).unwrap();
        assert_eq!(headers.get(DEFAULT_HEADER_NAME).unwrap(), "tok-1");
    }

    #[test]
    fn auth_values_are_marked_sensitive() {
        let (_, value) = auth_header(&target(AuthType::Bearer, None)).unwrap();
        assert!(value.is_sensitive());
    }

    #[test]
    fn invalid_credential_is_a_request_error() {
        let mut bad = target(AuthType::Bearer, None);
        bad.credential = Secret::new("line\nbreak");
        let err = build_headers(&bad).unwrap_err();
        assert!(matches!(err, DeliveryError::Request { .. }));
    }

    #[derive(Debug)]
    struct ClientError(std::io::Error);

    impl std::fmt::Display for ClientError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("client error (Connect)")
        }
    }

    impl std::error::Error for ClientError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn describe_walks_error_sources() {
        let err = ClientError(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert_eq!(describe(&err), "client error (Connect): connection refused");
    }
}
