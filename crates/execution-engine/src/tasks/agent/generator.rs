use super::naming::{AgentResourceNames, ORCHESTRATOR_PORT};
use super::resources::{
    build_deployment, build_service, build_skills_config_map, encode_descriptor_types,
    selected_descriptors, AgentInputs,
};
use crate::crds::condition::{
    conditions_equivalent, set_condition, CONDITION_PROVISIONED, CONDITION_TRUE,
};
use crate::crds::{Condition, DataAgentContainer, DataDescriptor, Endpoint};
use crate::tasks::cluster::ClusterResources;
use crate::tasks::config::{ModelConfig, PlatformConfig, PlatformLocation};
use crate::tasks::types::{cancellable, Error, Result};
use kube::{Resource, ResourceExt};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// What a provisioning pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionOutcome {
    /// `Kind/name` of children created during this pass
    pub created: Vec<String>,
    pub status_written: bool,
}

/// Turns a `DataAgentContainer` into its Service, Deployment and skills `ConfigMap`.
///
/// Children are created when absent and never updated afterwards.
pub struct DesiredStateGenerator<'a> {
    pub cluster: &'a dyn ClusterResources,
    pub platform: &'a PlatformLocation,
    pub cancel: &'a CancellationToken,
}

impl DesiredStateGenerator<'_> {
    pub async fn reconcile(&self, agent: &DataAgentContainer) -> Result<ProvisionOutcome> {
        let names = AgentResourceNames::for_container(agent);
        let owner = agent.controller_owner_ref(&()).ok_or(Error::MissingObjectKey)?;

        // Resolve everything before touching the cluster so a bad reference creates nothing
        let platform = self.platform_config().await?;
        let planner = self
            .model_config(&names.namespace, &agent.spec.model.planner_llm)
            .await?;
        let expert = self
            .model_config(&names.namespace, &agent.spec.model.expert_llm)
            .await?;
        let descriptor_types = self.descriptor_types(agent, &names.namespace).await?;

        let inputs = AgentInputs {
            agent,
            names: &names,
            platform: &platform,
            planner: &planner,
            expert: &expert,
            descriptor_types: &descriptor_types,
        };
        let service = build_service(&names, &owner)?;
        let skills = build_skills_config_map(agent, &names, &owner)?;
        let deployment = build_deployment(&inputs, &owner)?;

        let mut outcome = ProvisionOutcome::default();
        let ns = names.namespace.as_str();

        let existing = cancellable(self.cancel, self.cluster.get_service(ns, &names.service)).await??;
        if existing.is_none() {
            let created = cancellable(self.cancel, self.cluster.create_service(ns, &service)).await?;
            if record_create(created, "Service", &names.service)? {
                outcome.created.push(format!("Service/{}", names.service));
            }
        } else {
            debug!(service = %names.service, "Service already exists");
        }

        if let Some(skills) = skills {
            let existing =
                cancellable(self.cancel, self.cluster.get_config_map(ns, &names.skills)).await??;
            if existing.is_none() {
                let created =
                    cancellable(self.cancel, self.cluster.create_config_map(ns, &skills)).await?;
                if record_create(created, "ConfigMap", &names.skills)? {
                    outcome.created.push(format!("ConfigMap/{}", names.skills));
                }
            }
        }

        let existing =
            cancellable(self.cancel, self.cluster.get_deployment(ns, &names.deployment)).await??;
        if existing.is_none() {
            let created =
                cancellable(self.cancel, self.cluster.create_deployment(ns, &deployment)).await?;
            if record_create(created, "Deployment", &names.deployment)? {
                outcome.created.push(format!("Deployment/{}", names.deployment));
            }
        } else {
            debug!(deployment = %names.deployment, "Deployment already exists");
        }

        outcome.status_written = self.write_status(agent, &names).await?;
        Ok(outcome)
    }

    async fn platform_config(&self) -> Result<PlatformConfig> {
        let cm = cancellable(
            self.cancel,
            self.cluster.get_config_map(
                &self.platform.config_map_namespace,
                &self.platform.config_map_name,
            ),
        )
        .await??;
        if cm.is_none() {
            debug!(
                config_map = %self.platform.config_map_name,
                "Platform ConfigMap not found, using defaults"
            );
        }
        Ok(PlatformConfig::from_config_map(cm.as_ref()))
    }

    async fn model_config(&self, namespace: &str, name: &str) -> Result<ModelConfig> {
        let missing = || Error::ModelConfigMissing {
            name: name.to_string(),
            namespace: namespace.to_string(),
        };
        if name.trim().is_empty() {
            return Err(missing());
        }
        let cm = cancellable(self.cancel, self.cluster.get_config_map(namespace, name))
            .await??
            .ok_or_else(missing)?;
        Ok(ModelConfig::from_config_map(&cm))
    }

    async fn descriptor_types(&self, agent: &DataAgentContainer, namespace: &str) -> Result<String> {
        let mut resolved: Vec<(String, DataDescriptor)> = Vec::new();
        for name in selected_descriptors(agent) {
            let descriptor =
                cancellable(self.cancel, self.cluster.get_data_descriptor(namespace, &name))
                    .await??
                    .ok_or_else(|| Error::DataDescriptorMissing {
                        name: name.clone(),
                        namespace: namespace.to_string(),
                    })?;
            resolved.push((name, descriptor));
        }
        Ok(encode_descriptor_types(
            resolved.iter().map(|(name, dd)| (name.as_str(), dd)),
        ))
    }

    async fn write_status(
        &self,
        agent: &DataAgentContainer,
        names: &AgentResourceNames,
    ) -> Result<bool> {
        let observed = agent.status.clone().unwrap_or_default();
        let endpoint = Endpoint {
            address: names.service_host(),
            port: ORCHESTRATOR_PORT,
            protocol: "http".to_string(),
        };

        let mut conditions = observed.conditions.clone();
        set_condition(
            &mut conditions,
            Condition::new(
                CONDITION_PROVISIONED,
                CONDITION_TRUE,
                "ResourcesCreated",
                format!("Service {} and Deployment {} exist", names.service, names.deployment),
            ),
        );

        if observed.endpoint.as_ref() == Some(&endpoint)
            && conditions_equivalent(&observed.conditions, &conditions)
        {
            debug!("Agent container status unchanged, skipping update");
            return Ok(false);
        }

        let patch = json!({
            "status": {
                "endpoint": endpoint,
                "conditions": conditions
            }
        });
        cancellable(
            self.cancel,
            self.cluster
                .patch_agent_container_status(&names.namespace, &agent.name_any(), &patch),
        )
        .await??;
        info!(agent = %agent.name_any(), "Updated agent container status");
        Ok(true)
    }
}

/// `Ok(true)` when created, `Ok(false)` when a concurrent create won the race.
fn record_create(result: std::result::Result<(), kube::Error>, kind: &str, name: &str) -> Result<bool> {
    match result {
        Ok(()) => {
            info!("Created {}: {}", kind, name);
            Ok(true)
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            debug!("{} {} already exists", kind, name);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
