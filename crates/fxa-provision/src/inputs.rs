use crate::graph::ResourceKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("{0} must not be empty")]
    MissingInput(&'static str),

    #[error("name override for {0} must not be empty")]
    BlankOverride(ResourceKind),

    #[error("{field} is not a resource id: '{value}'")]
    InvalidResourceId { field: &'static str, value: String },
}

/// Everything the planner needs; the planner reads nothing else
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningInputs {
    pub environment_name: String,
    pub location: String,
    pub subscription_id: String,
    pub resource_group: String,

    #[serde(default = "default_true")]
    pub create_ai_project: bool,
    #[serde(default = "default_true")]
    pub create_registry: bool,
    #[serde(default = "default_true")]
    pub enable_monitoring: bool,

    /// Replaces the generated name of a resource verbatim
    #[serde(default)]
    pub name_overrides: BTreeMap<ResourceKind, String>,
    pub existing_ai_account_id: Option<String>,
    pub existing_registry_id: Option<String>,
}

fn default_true() -> bool {
    true
}

impl ProvisioningInputs {
    pub fn new(
        environment_name: impl Into<String>,
        location: impl Into<String>,
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
    ) -> Self {
        Self {
            environment_name: environment_name.into(),
            location: location.into(),
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            create_ai_project: true,
            create_registry: true,
            enable_monitoring: true,
            name_overrides: BTreeMap::new(),
            existing_ai_account_id: None,
            existing_registry_id: None,
        }
    }

    pub fn with_override(mut self, kind: ResourceKind, name: impl Into<String>) -> Self {
        self.name_overrides.insert(kind, name.into());
        self
    }

    /// Check inputs before planning
    pub fn validate(&self) -> Result<(), ProvisionError> {
        let required = [
            ("environment_name", &self.environment_name),
            ("location", &self.location),
            ("subscription_id", &self.subscription_id),
            ("resource_group", &self.resource_group),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ProvisionError::MissingInput(field));
            }
        }

        if let Some((kind, _)) = self.name_overrides.iter().find(|(_, n)| n.trim().is_empty()) {
            return Err(ProvisionError::BlankOverride(*kind));
        }

        let existing = [
            ("existing_ai_account_id", self.existing_ai_account()),
            ("existing_registry_id", self.existing_registry()),
        ];
        for (field, value) in existing {
            if let Some(id) = value {
                if !id.starts_with('/') || id.trim_end_matches('/').is_empty() {
                    return Err(ProvisionError::InvalidResourceId {
                        field,
                        value: id.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Existing AI account id; blank counts as unset
    pub fn existing_ai_account(&self) -> Option<&str> {
        non_blank(&self.existing_ai_account_id)
    }

    pub fn existing_registry(&self) -> Option<&str> {
        non_blank(&self.existing_registry_id)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
