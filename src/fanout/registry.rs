//! The validated, load-ordered list of partner targets.

use crate::config::model::{RedactedTarget, Target, TargetSpec};
use crate::config::sources::{parse_targets_str, TargetsSource};
use crate::config::validation::validate_targets;
use crate::error::FleetError;

#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: Vec<Target>,
}

impl TargetRegistry {
    pub fn from_specs(specs: &[TargetSpec]) -> Result<Self, FleetError> {
        let targets =
            validate_targets(specs).map_err(|errors| FleetError::ConfigValidation { errors })?;
        Ok(Self { targets })
    }

    /// Build a registry from a JSON list, as found in `FANOUT_TARGETS_JSON`.
    pub fn from_json(raw: &str) -> Result<Self, FleetError> {
        let specs = parse_targets_str("json", raw, "FANOUT_TARGETS_JSON")?;
        Self::from_specs(&specs)
    }

    pub async fn load(source: &TargetsSource) -> Result<Self, FleetError> {
        let specs = source.read_specs().await?;
        Self::from_specs(&specs)
    }

    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    #[must_use]
    pub fn redacted_view(&self) -> Vec<RedactedTarget> {
        self.targets.iter().map(Target::redacted).collect()
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.name.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
