//! Integration tests for partner target loading across file formats.

use std::path::PathBuf;

use fleet_relay::config::model::AuthType;
use fleet_relay::config::sources::parse_targets_str;
use fleet_relay::config::TargetsSource;
use fleet_relay::error::FleetError;
use fleet_relay::fanout::registry::TargetRegistry;

fn load_example(name: &str) -> String {
    let path = format!("example/{name}");
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

#[test]
fn json_example_loads_and_validates() {
    let specs = parse_targets_str("json", &load_example("partners.json"), "partners.json").unwrap();
    let registry = TargetRegistry::from_specs(&specs).unwrap();
    assert_eq!(registry.names(), vec!["PartnerA", "PartnerB"]);
    assert_eq!(registry.targets()[1].auth_type, AuthType::Header);
    assert_eq!(
        registry.targets()[1].header_name.as_deref(),
        Some("X-Partner-Token")
    );
}

#[cfg(feature = "yaml")]
#[test]
fn yaml_example_matches_json_example() {
    let json = parse_targets_str("json", &load_example("partners.json"), "partners.json").unwrap();
    let yaml = parse_targets_str("yaml", &load_example("partners.yaml"), "partners.yaml").unwrap();
    let json = TargetRegistry::from_specs(&json).unwrap();
    let yaml = TargetRegistry::from_specs(&yaml).unwrap();
    assert_eq!(json.redacted_view(), yaml.redacted_view());
}

#[tokio::test]
async fn file_source_loads_in_order() {
    let registry = TargetRegistry::load(&TargetsSource::File(PathBuf::from("example/partners.json")))
        .await
        .unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.targets()[0].name, "PartnerA");
}

#[tokio::test]
async fn missing_file_is_reported() {
    let err = TargetRegistry::load(&TargetsSource::File(PathBuf::from("example/nope.json")))
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::TargetsFileNotFound { .. }));
}

#[test]
fn empty_inline_list_is_valid() {
    let registry = TargetRegistry::from_json("[]").unwrap();
    assert!(registry.is_empty());
}

#[test]
fn inline_entry_with_extra_keys_loads() {
    let registry = TargetRegistry::from_json(
        r#"[{"name":"A","url":"https://a.example.com/in","auth_type":"bearer","api_key":"k","description":"primary partner"}]"#,
    )
    .unwrap();
    assert_eq!(registry.names(), vec!["A"]);
    assert_eq!(registry.targets()[0].credential.expose(), "k");
}

#[test]
fn inline_object_is_not_a_list() {
    let err = TargetRegistry::from_json(r#"{"name":"A"}"#).unwrap_err();
    match err {
        FleetError::TargetsNotList { source_label, found } => {
            assert_eq!(source_label, "FANOUT_TARGETS_JSON");
            assert_eq!(found, "an object");
        }
        other => panic!("expected TargetsNotList, got {other:?}"),
    }
}

#[test]
fn inline_malformed_json_is_a_parse_error() {
    let err = TargetRegistry::from_json("[{").unwrap_err();
    assert!(matches!(err, FleetError::ConfigParse { .. }));
}

#[test]
fn invalid_entries_are_all_reported_without_credentials() {
    let raw = r#"[
        {"name":"A","url":"ftp://a.example.com","auth_type":"bearer","credential":"s3cret-a"},
        {"name":"B","url":"https://b.example.com","auth_type":"header","credential":"s3cret-b"},
        {"name":"C","url":"https://c.example.com","auth_type":"basic","credential":"s3cret-c"}
    ]"#;
    let err = TargetRegistry::from_json(raw).unwrap_err();
    let FleetError::ConfigValidation { errors } = &err else {
        panic!("expected ConfigValidation, got {err:?}");
    };
    assert_eq!(errors.len(), 3);
    let rendered = err.to_string();
    assert!(!rendered.contains("s3cret"));
}
