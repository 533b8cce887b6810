//! # FXA Provision
//!
//! Declarative description of the cloud resources that host the agent.
//!
//! [`plan`] is a pure function: the same [`ProvisioningInputs`] always give
//! the same [`ResourceGraph`], names included. Optional resources are
//! [`ResourceSlot`]s, so a disabled resource is `Absent` rather than an error.

pub mod graph;
pub mod inputs;
pub mod naming;

pub use graph::{Resource, ResourceGraph, ResourceKind, ResourceSlot};
pub use inputs::{ProvisionError, ProvisioningInputs};
pub use naming::{TOKEN_LEN, generated_name, resource_token};

use std::collections::BTreeMap;

/// Build the resource graph for one environment
pub fn plan(inputs: &ProvisioningInputs) -> ResourceGraph {
    let token = resource_token(
        &inputs.subscription_id,
        &inputs.resource_group,
        &inputs.environment_name,
    );
    let mut planner = Planner {
        inputs,
        token: &token,
        slots: BTreeMap::new(),
    };

    planner.provision(ResourceKind::ManagedIdentity, BTreeMap::new());

    if inputs.enable_monitoring {
        planner.provision(
            ResourceKind::LogAnalyticsWorkspace,
            props([("retentionInDays", "30".to_string())]),
        );
        planner.provision(
            ResourceKind::ApplicationInsights,
            props([("kind", "web".to_string())]),
        );
    }

    match inputs.existing_registry() {
        Some(id) => planner.reference(ResourceKind::ContainerRegistry, id),
        None if inputs.create_registry => planner.provision(
            ResourceKind::ContainerRegistry,
            props([("sku", "Basic".to_string())]),
        ),
        None => {}
    }

    planner.provision(ResourceKind::ContainerAppsEnvironment, BTreeMap::new());

    // The project is only created next to an account created here; an
    // existing account brings its own project
    match inputs.existing_ai_account() {
        Some(id) => planner.reference(ResourceKind::AiAccount, id),
        None if inputs.create_ai_project => {
            planner.provision(ResourceKind::AiAccount, props([("kind", "AIServices".to_string())]));
            let account = planner.name_of(ResourceKind::AiAccount);
            planner.provision(ResourceKind::AiProject, props([("account", account)]));
        }
        None => {}
    }

    let app_properties = planner.container_app_properties();
    planner.provision(ResourceKind::ContainerApp, app_properties);

    ResourceGraph {
        environment_name: inputs.environment_name.clone(),
        resource_token: token.clone(),
        slots: planner.slots,
    }
}

fn props<const N: usize>(entries: [(&str, String); N]) -> BTreeMap<String, String> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

struct Planner<'a> {
    inputs: &'a ProvisioningInputs,
    token: &'a str,
    slots: BTreeMap<ResourceKind, ResourceSlot>,
}

impl Planner<'_> {
    fn name(&self, kind: ResourceKind) -> String {
        self.inputs
            .name_overrides
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| generated_name(kind, self.token))
    }

    fn name_of(&self, kind: ResourceKind) -> String {
        self.slots
            .get(&kind)
            .map(|slot| slot.name().to_string())
            .unwrap_or_default()
    }

    fn id_of(&self, kind: ResourceKind) -> String {
        self.slots
            .get(&kind)
            .map(|slot| slot.id().to_string())
            .unwrap_or_default()
    }

    /// Only provisioned resources are deployment dependencies
    fn dependencies(&self, kind: ResourceKind) -> Vec<ResourceKind> {
        let candidates: &[ResourceKind] = match kind {
            ResourceKind::ApplicationInsights => &[ResourceKind::LogAnalyticsWorkspace],
            ResourceKind::ContainerRegistry => &[ResourceKind::ManagedIdentity],
            ResourceKind::ContainerAppsEnvironment => &[ResourceKind::LogAnalyticsWorkspace],
            ResourceKind::AiProject => &[ResourceKind::AiAccount],
            ResourceKind::ContainerApp => &[
                ResourceKind::ManagedIdentity,
                ResourceKind::ApplicationInsights,
                ResourceKind::ContainerRegistry,
                ResourceKind::ContainerAppsEnvironment,
                ResourceKind::AiProject,
            ],
            _ => &[],
        };
        candidates
            .iter()
            .copied()
            .filter(|dep| {
                self.slots
                    .get(dep)
                    .is_some_and(|slot| slot.resource().is_some())
            })
            .collect()
    }

    fn provision(&mut self, kind: ResourceKind, properties: BTreeMap<String, String>) {
        let name = self.name(kind);
        let id = self.resource_id(kind, &name);
        let resource = Resource {
            kind,
            id,
            name,
            resource_type: kind.resource_type().to_string(),
            location: self.inputs.location.clone(),
            depends_on: self.dependencies(kind),
            properties,
        };
        self.slots.insert(kind, ResourceSlot::Provisioned(resource));
    }

    /// ARM id; a project lives under its account
    fn resource_id(&self, kind: ResourceKind, name: &str) -> String {
        let group = format!(
            "/subscriptions/{}/resourceGroups/{}/providers",
            self.inputs.subscription_id, self.inputs.resource_group
        );
        match kind {
            ResourceKind::AiProject => format!(
                "{}/{}/{}/projects/{}",
                group,
                ResourceKind::AiAccount.resource_type(),
                self.name_of(ResourceKind::AiAccount),
                name
            ),
            _ => format!("{}/{}/{}", group, kind.resource_type(), name),
        }
    }

    fn reference(&mut self, kind: ResourceKind, id: &str) {
        let id = id.trim_end_matches('/').to_string();
        self.slots.insert(kind, ResourceSlot::Referenced { id });
    }

    /// Settings handed to the agent container; blank when a resource is absent
    fn container_app_properties(&self) -> BTreeMap<String, String> {
        let registry_server = match self.slots.get(&ResourceKind::ContainerRegistry) {
            Some(slot) if slot.is_present() => format!("{}.azurecr.io", slot.name()),
            _ => String::new(),
        };

        props([
            ("targetPort", "8080".to_string()),
            ("ingress", "external".to_string()),
            ("identity", self.id_of(ResourceKind::ManagedIdentity)),
            ("registryServer", registry_server),
            (
                "env.APPLICATION_INSIGHTS_RESOURCE_ID",
                self.id_of(ResourceKind::ApplicationInsights),
            ),
            (
                "env.APPLICATION_INSIGHTS_AGENT_NAME",
                format!("fxa-{}", self.inputs.environment_name),
            ),
            ("env.AZURE_AI_ACCOUNT_ID", self.id_of(ResourceKind::AiAccount)),
            ("env.AZURE_AI_PROJECT_ID", self.id_of(ResourceKind::AiProject)),
        ])
    }
}
