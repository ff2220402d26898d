//! Loading partner target lists from inline JSON or a file.
//!
//! [`parse_targets_str`] dispatches on format (`json` always, `yaml`/`yml`
//! behind the `yaml` feature), then [`specs_from_value`] enforces the
//! list-of-objects shape before the entries go through validation.

use std::path::{Path, PathBuf};

use crate::config::model::{TargetSpec, TARGET_FIELDS};
use crate::error::FleetError;

/// Where the target list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetsSource {
    Inline(String),
    File(PathBuf),
}

impl TargetsSource {
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Inline(_) => "FANOUT_TARGETS_JSON".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    pub async fn read_specs(&self) -> Result<Vec<TargetSpec>, FleetError> {
        match self {
            Self::Inline(raw) => parse_targets_str("json", raw, &self.label()),
            Self::File(path) => {
                let content = read_file(path).await?;
                parse_targets_str(extension(path), &content, &self.label())
            }
        }
    }
}

#[must_use]
pub fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

async fn read_file(path: &Path) -> Result<String, FleetError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FleetError::TargetsFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            FleetError::Io(e)
        }
    })
}

/// Parse a target list string based on its format.
pub fn parse_targets_str(
    ext: &str,
    content: &str,
    source_label: &str,
) -> Result<Vec<TargetSpec>, FleetError> {
    let value: serde_json::Value = match ext {
        "json" => serde_json::from_str(content).map_err(|e| FleetError::ConfigParse {
            source_label: source_label.to_string(),
            source: Box::new(e),
        })?,

        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| FleetError::ConfigParse {
            source_label: source_label.to_string(),
            source: Box::new(e),
        })?,

        other => return Err(FleetError::UnsupportedFormat(other.to_string())),
    };

    specs_from_value(value, source_label)
}

/// Turn an already-parsed document into target specs, rejecting anything
/// that is not a list of target objects.
pub fn specs_from_value(
    value: serde_json::Value,
    source_label: &str,
) -> Result<Vec<TargetSpec>, FleetError> {
    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(FleetError::TargetsNotList {
                source_label: source_label.to_string(),
                found: json_type_name(&other),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            for key in unknown_keys(&item) {
                tracing::warn!(
                    source = %source_label,
                    index = i,
                    key,
                    "ignoring unknown key in target entry"
                );
            }
            serde_json::from_value::<TargetSpec>(item).map_err(|e| FleetError::ConfigParse {
                source_label: format!("{source_label} (targets[{i}])"),
                source: Box::new(e),
            })
        })
        .collect()
}

fn unknown_keys(item: &serde_json::Value) -> Vec<&str> {
    item.as_object()
        .map(|entry| {
            entry
                .keys()
                .map(String::as_str)
                .filter(|key| !TARGET_FIELDS.contains(key))
                .collect()
        })
        .unwrap_or_default()
}

const fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "an object",
    }
}
