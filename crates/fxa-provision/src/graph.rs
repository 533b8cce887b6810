use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Every resource the descriptor knows about.
///
/// The declaration order doubles as the tie-break order for deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    ManagedIdentity,
    LogAnalyticsWorkspace,
    ApplicationInsights,
    ContainerRegistry,
    ContainerAppsEnvironment,
    AiAccount,
    AiProject,
    ContainerApp,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::ManagedIdentity,
        ResourceKind::LogAnalyticsWorkspace,
        ResourceKind::ApplicationInsights,
        ResourceKind::ContainerRegistry,
        ResourceKind::ContainerAppsEnvironment,
        ResourceKind::AiAccount,
        ResourceKind::AiProject,
        ResourceKind::ContainerApp,
    ];

    /// Name prefix for generated names
    pub fn abbreviation(self) -> &'static str {
        match self {
            ResourceKind::ManagedIdentity => "id-",
            ResourceKind::LogAnalyticsWorkspace => "log-",
            ResourceKind::ApplicationInsights => "appi-",
            ResourceKind::ContainerRegistry => "cr",
            ResourceKind::ContainerAppsEnvironment => "cae-",
            ResourceKind::AiAccount => "aif-",
            ResourceKind::AiProject => "proj-",
            ResourceKind::ContainerApp => "ca-",
        }
    }

    /// ARM resource type
    pub fn resource_type(self) -> &'static str {
        match self {
            ResourceKind::ManagedIdentity => "Microsoft.ManagedIdentity/userAssignedIdentities",
            ResourceKind::LogAnalyticsWorkspace => "Microsoft.OperationalInsights/workspaces",
            ResourceKind::ApplicationInsights => "Microsoft.Insights/components",
            ResourceKind::ContainerRegistry => "Microsoft.ContainerRegistry/registries",
            ResourceKind::ContainerAppsEnvironment => "Microsoft.App/managedEnvironments",
            ResourceKind::AiAccount => "Microsoft.CognitiveServices/accounts",
            ResourceKind::AiProject => "Microsoft.CognitiveServices/accounts/projects",
            ResourceKind::ContainerApp => "Microsoft.App/containerApps",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::ManagedIdentity => "managed_identity",
            ResourceKind::LogAnalyticsWorkspace => "log_analytics_workspace",
            ResourceKind::ApplicationInsights => "application_insights",
            ResourceKind::ContainerRegistry => "container_registry",
            ResourceKind::ContainerAppsEnvironment => "container_apps_environment",
            ResourceKind::AiAccount => "ai_account",
            ResourceKind::AiProject => "ai_project",
            ResourceKind::ContainerApp => "container_app",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource this deployment creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub name: String,
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub location: String,
    /// Provisioned resources that must exist first
    pub depends_on: Vec<ResourceKind>,
    pub properties: BTreeMap<String, String>,
}

/// Whether, and how, a resource takes part in a deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResourceSlot {
    Provisioned(Resource),
    /// Pre-existing resource, used by id and never modified
    Referenced { id: String },
    Absent,
}

impl ResourceSlot {
    pub fn is_present(&self) -> bool {
        !matches!(self, ResourceSlot::Absent)
    }

    pub fn resource(&self) -> Option<&Resource> {
        match self {
            ResourceSlot::Provisioned(resource) => Some(resource),
            _ => None,
        }
    }

    /// Resource id output; blank when absent
    pub fn id(&self) -> &str {
        match self {
            ResourceSlot::Provisioned(resource) => &resource.id,
            ResourceSlot::Referenced { id } => id,
            ResourceSlot::Absent => "",
        }
    }

    /// Name output; blank when absent. Referenced ids end in the name.
    pub fn name(&self) -> &str {
        match self {
            ResourceSlot::Provisioned(resource) => &resource.name,
            ResourceSlot::Referenced { id } => id
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or_default(),
            ResourceSlot::Absent => "",
        }
    }
}

/// The planned deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGraph {
    pub environment_name: String,
    pub resource_token: String,
    pub slots: BTreeMap<ResourceKind, ResourceSlot>,
}

impl ResourceGraph {
    pub fn slot(&self, kind: ResourceKind) -> &ResourceSlot {
        self.slots.get(&kind).unwrap_or(&ResourceSlot::Absent)
    }

    /// Resources this deployment creates, in kind order
    pub fn provisioned(&self) -> impl Iterator<Item = &Resource> {
        self.slots.values().filter_map(ResourceSlot::resource)
    }

    /// Provisioned resources ordered so each comes after its dependencies.
    ///
    /// Ties are broken by kind order, so the result is stable.
    pub fn deployment_order(&self) -> Vec<ResourceKind> {
        let mut pending: BTreeMap<ResourceKind, BTreeSet<ResourceKind>> = self
            .provisioned()
            .map(|r| {
                let deps = r
                    .depends_on
                    .iter()
                    .copied()
                    .filter(|d| self.slot(*d).resource().is_some())
                    .collect();
                (r.kind, deps)
            })
            .collect();

        let mut order = Vec::with_capacity(pending.len());
        while let Some(next) = pending
            .iter()
            .find(|(_, deps)| deps.is_empty())
            .map(|(kind, _)| *kind)
        {
            pending.remove(&next);
            for deps in pending.values_mut() {
                deps.remove(&next);
            }
            order.push(next);
        }

        // Leftovers would mean a cycle; the planner never builds one
        order.extend(pending.into_keys());
        order
    }

    /// Flat `<kind>_id` / `<kind>_name` outputs, blank for absent resources
    pub fn outputs(&self) -> BTreeMap<String, String> {
        let mut outputs = BTreeMap::new();
        for kind in ResourceKind::ALL {
            let slot = self.slot(kind);
            outputs.insert(format!("{}_id", kind), slot.id().to_string());
            outputs.insert(format!("{}_name", kind), slot.name().to_string());
        }
        outputs
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let value = serde_json::json!({
            "graph": self,
            "deployment_order": self.deployment_order(),
            "outputs": self.outputs(),
        });
        serde_json::to_string_pretty(&value)
    }
}
