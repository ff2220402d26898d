//! Target validation with detailed error reporting.
//!
//! The [`validate_targets`] function checks parsed [`TargetSpec`] entries
//! for empty or duplicate names, malformed URLs, unsupported auth types,
//! missing header names and unusable credentials. On success it returns the
//! validated [`Target`] list; on failure, every problem found with
//! per-field suggestions.

use std::collections::HashSet;

use axum::http::{HeaderName, HeaderValue};
use url::Url;

use super::model::{AuthType, Target, TargetSpec};
use crate::error::ValidationError;

/// Validate a single target URL. Returns the parsed URL or a human-readable error.
pub fn validate_target_url(url: &str) -> Result<Url, String> {
    match Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            } else if parsed.host_str().is_none() {
                Err(format!("'{url}' has no host"))
            } else {
                Ok(parsed)
            }
        }
        Err(_) => Err(format!("'{url}' is not a valid URL")),
    }
}

/// Validate a custom auth header name. Returns `Ok(())` or a human-readable error.
pub fn validate_header_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("header_name cannot be empty".into());
    }
    name.parse::<HeaderName>()
        .map(|_| ())
        .map_err(|_| format!("'{name}' is not a valid HTTP header name"))
}

pub fn validate_targets(specs: &[TargetSpec]) -> Result<Vec<Target>, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut targets = Vec::with_capacity(specs.len());
    let mut seen_names = HashSet::new();

    for (i, spec) in specs.iter().enumerate() {
        let target_id = if spec.name.is_empty() {
            format!("targets[{i}]")
        } else {
            spec.name.clone()
        };
        let error_count = errors.len();

        if spec.name.trim().is_empty() {
            errors.push(ValidationError {
                target: target_id.clone(),
                field: "name".into(),
                message: "name cannot be empty".into(),
                suggestion: None,
            });
        } else if !seen_names.insert(spec.name.as_str()) {
            errors.push(ValidationError {
                target: target_id.clone(),
                field: "name".into(),
                message: "duplicate target name".into(),
                suggestion: None,
            });
        }

        let url = match validate_target_url(&spec.url) {
            Ok(url) => Some(url),
            Err(msg) => {
                errors.push(ValidationError {
                    target: target_id.clone(),
                    field: "url".into(),
                    suggestion: if spec.url.contains("://") {
                        None
                    } else {
                        Some(format!("did you mean 'https://{}'?", spec.url))
                    },
                    message: msg,
                });
                None
            }
        };

        let auth_type = match spec.auth_type.parse::<AuthType>() {
            Ok(auth_type) => Some(auth_type),
            Err(msg) => {
                errors.push(ValidationError {
                    target: target_id.clone(),
                    field: "auth_type".into(),
                    message: msg,
                    suggestion: Some("expected 'bearer' or 'header'".into()),
                });
                None
            }
        };

        if auth_type == Some(AuthType::Header) {
            match spec.header_name.as_deref() {
                None => errors.push(ValidationError {
                    target: target_id.clone(),
                    field: "header_name".into(),
                    message: "header_name is required for auth_type 'header'".into(),
                    suggestion: Some("e.g. \"header_name\": \"X-API-Key\"".into()),
                }),
                Some(name) => {
                    if let Err(msg) = validate_header_name(name) {
                        errors.push(ValidationError {
                            target: target_id.clone(),
                            field: "header_name".into(),
                            message: msg,
                            suggestion: None,
                        });
                    }
                }
            }
        }

        if spec.credential.is_empty() {
            errors.push(ValidationError {
                target: target_id.clone(),
                field: "credential".into(),
                message: "credential cannot be empty".into(),
                suggestion: None,
            });
        } else if HeaderValue::from_str(spec.credential.expose()).is_err() {
            // Never echo the credential itself.
            errors.push(ValidationError {
                target: target_id.clone(),
                field: "credential".into(),
                message: "credential contains characters not allowed in an HTTP header".into(),
                suggestion: None,
            });
        }

        if errors.len() > error_count {
            continue;
        }
        if let (Some(url), Some(auth_type)) = (url, auth_type) {
            targets.push(Target {
                name: spec.name.clone(),
                url,
                auth_type,
                credential: spec.credential.clone(),
                header_name: spec.header_name.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(targets)
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(source_label: &str, targets: &[Target]) -> String {
    let mut lines = vec![format!("  {} targets\n", targets.len())];

    for target in targets {
        let auth = match (target.auth_type, target.header_name.as_deref()) {
            (AuthType::Header, Some(name)) => format!("header ({name})"),
            (auth_type, _) => auth_type.to_string(),
        };
        lines.push(format!("  {}  -> {}", target.name, target.url));
        lines.push(format!("    auth: {auth}"));
    }

    format!("{} is valid\n{}", source_label, lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::Secret;

    fn spec(name: &str, url: &str, auth_type: &str, header_name: Option<&str>) -> TargetSpec {
        TargetSpec {
            name: name.into(),
            url: url.into(),
            auth_type: auth_type.into(),
            credential: Secret::new("token"),
            header_name: header_name.map(Into::into),
        }
    }

    #[test]
    fn valid_targets_pass_in_order() {
        let targets = validate_targets(&[
            spec("A", "https://a.example.com/ingest", "bearer", None),
            spec("B", "http://b.example.com:8080/in", "header", Some("X-Partner-Key")),
        ])
        .unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].name, "A");
        assert_eq!(targets[0].auth_type, AuthType::Bearer);
        assert_eq!(targets[1].name, "B");
        assert_eq!(targets[1].header_name.as_deref(), Some("X-Partner-Key"));
    }

    #[test]
    fn empty_list_is_valid() {
        assert!(validate_targets(&[]).unwrap().is_empty());
    }

    #[test]
    fn empty_name_fails() {
        let errors = validate_targets(&[spec("", "https://a.example.com", "bearer", None)])
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].target, "targets[0]");
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn duplicate_name_fails() {
        let errors = validate_targets(&[
            spec("A", "https://a.example.com", "bearer", None),
            spec("A", "https://b.example.com", "bearer", None),
        ])
        .unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.message.contains("duplicate target name")));
    }

    #[test]
    fn invalid_url_fails_with_suggestion() {
        let errors =
            validate_targets(&[spec("A", "a.example.com/in", "bearer", None)]).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("not a valid URL")));
        assert_eq!(
            errors[0].suggestion.as_deref(),
            Some("did you mean 'https://a.example.com/in'?")
        );
    }

    #[test]
    fn non_http_scheme_fails() {
        let errors =
            validate_targets(&[spec("A", "ftp://a.example.com", "bearer", None)]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.message.contains("unsupported scheme 'ftp'")));
    }

    #[test]
    fn unknown_auth_type_fails() {
        let errors =
            validate_targets(&[spec("A", "https://a.example.com", "basic", None)]).unwrap_err();
        assert_eq!(errors[0].field, "auth_type");
        assert_eq!(
            errors[0].suggestion.as_deref(),
            Some("expected 'bearer' or 'header'")
        );
    }

    #[test]
    fn header_auth_requires_header_name() {
        let errors =
            validate_targets(&[spec("B", "https://b.example.com", "header", None)]).unwrap_err();
        assert_eq!(errors[0].field, "header_name");
        assert!(errors[0].message.contains("required"));
    }

    #[test]
    fn header_auth_rejects_empty_or_invalid_header_name() {
        let errors =
            validate_targets(&[spec("B", "https://b.example.com", "header", Some(""))]).unwrap_err();
        assert!(errors[0].message.contains("cannot be empty"));

        let errors = validate_targets(&[spec(
            "B",
            "https://b.example.com",
            "header",
            Some("bad header"),
        )])
        .unwrap_err();
        assert!(errors[0].message.contains("not a valid HTTP header name"));
    }

    #[test]
    fn bearer_ignores_header_name() {
        let targets = validate_targets(&[spec(
            "A",
            "https://a.example.com",
            "bearer",
            Some("not a header"),
        )])
        .unwrap();
        assert_eq!(targets.len(), 1);
    }

    #[test]
    fn empty_credential_fails() {
        let mut bad = spec("A", "https://a.example.com", "bearer", None);
        bad.credential = Secret::new("");
        let errors = validate_targets(&[bad]).unwrap_err();
        assert_eq!(errors[0].field, "credential");
    }

    #[test]
    fn credential_with_newline_fails_without_echoing_it() {
        let mut bad = spec("A", "https://a.example.com", "bearer", None);
        bad.credential = Secret::new("abc\ndef");
        let errors = validate_targets(&[bad]).unwrap_err();
        assert_eq!(errors[0].field, "credential");
        assert!(!errors[0].to_string().contains("abc"));
    }

    #[test]
    fn collects_errors_across_targets() {
        let errors = validate_targets(&[
            spec("A", "nope", "bearer", None),
            spec("B", "https://b.example.com", "magic", None),
        ])
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].target, "A");
        assert_eq!(errors[1].target, "B");
    }

    #[test]
    fn report_lists_targets_without_credentials() {
        let targets = validate_targets(&[
            spec("A", "https://a.example.com/in", "bearer", None),
            spec("B", "https://b.example.com/in", "header", Some("X-Key")),
        ])
        .unwrap();
        let report = format_validation_report("targets.json", &targets);
        assert!(report.starts_with("targets.json is valid"));
        assert!(report.contains("A  -> https://a.example.com/in"));
        assert!(report.contains("auth: header (X-Key)"));
        assert!(!report.contains("token"));
    }
}
