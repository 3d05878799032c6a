//! Desired child objects of a `DataAgentContainer`.
//!
//! Everything here is pure: builders take resolved configuration and return typed
//! objects, leaving cluster I/O to the generator.

use super::naming::{
    AgentResourceNames, EXPERT_CONTAINER, EXPERT_PORT, ORCHESTRATOR_CONTAINER, ORCHESTRATOR_PORT,
    SKILLS_KEY, SKILLS_MOUNT_PATH, SKILLS_VOLUME,
};
use crate::crds::{DataAgentContainer, DataDescriptor};
use crate::tasks::config::{ModelConfig, PlatformConfig};
use crate::tasks::types::Result;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// The two agent processes sharing one pod
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRole {
    Orchestrator,
    Expert,
}

impl AgentRole {
    pub fn container_name(self) -> &'static str {
        match self {
            Self::Orchestrator => ORCHESTRATOR_CONTAINER,
            Self::Expert => EXPERT_CONTAINER,
        }
    }

    pub fn port(self) -> i32 {
        match self {
            Self::Orchestrator => ORCHESTRATOR_PORT,
            Self::Expert => EXPERT_PORT,
        }
    }

    /// Separate cache partitions keep orchestrator and expert state apart
    fn redis_db(self) -> &'static str {
        match self {
            Self::Orchestrator => "0",
            Self::Expert => "1",
        }
    }
}

/// Resolved inputs for the agent workload
pub struct AgentInputs<'a> {
    pub agent: &'a DataAgentContainer,
    pub names: &'a AgentResourceNames,
    pub platform: &'a PlatformConfig,
    pub planner: &'a ModelConfig,
    pub expert: &'a ModelConfig,
    pub descriptor_types: &'a str,
}

impl AgentInputs<'_> {
    fn model(&self, role: AgentRole) -> &ModelConfig {
        match role {
            AgentRole::Orchestrator => self.planner,
            AgentRole::Expert => self.expert,
        }
    }

    fn image(&self, role: AgentRole) -> &str {
        match role {
            AgentRole::Orchestrator => &self.platform.orchestrator_agent_image,
            AgentRole::Expert => &self.platform.expert_agent_image,
        }
    }

    fn has_skills(&self) -> bool {
        !self.agent.spec.agent_card.skills.is_empty()
    }
}

pub fn app_labels(names: &AgentResourceNames) -> BTreeMap<String, String> {
    BTreeMap::from([("app".to_string(), names.app.clone())])
}

/// Trimmed, non-blank descriptor names in declared order.
pub fn selected_descriptors(agent: &DataAgentContainer) -> Vec<String> {
    agent
        .spec
        .data_policy
        .source_name_selector
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Encode `name:type(:key:value)*` records joined by `;`.
///
/// Records follow the order of `descriptors`; connection pairs come from each
/// descriptor's first source in sorted key order.
pub fn encode_descriptor_types<'a, I>(descriptors: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a DataDescriptor)>,
{
    descriptors
        .into_iter()
        .map(|(name, descriptor)| {
            let mut record = format!("{name}:{}", descriptor.spec.descriptor_type);
            if let Some(first) = descriptor.spec.sources.first() {
                for (key, value) in &first.metadata {
                    record.push(':');
                    record.push_str(key);
                    record.push(':');
                    record.push_str(value);
                }
            }
            record
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Environment of one agent process, in the order the processes expect it.
pub fn agent_env(inputs: &AgentInputs<'_>, role: AgentRole) -> Vec<(&'static str, String)> {
    let agent = inputs.agent;
    let platform = inputs.platform;

    let mut env = vec![
        ("Agent_Host", inputs.names.service_host()),
        ("Agent_Port", role.port().to_string()),
    ];
    if role == AgentRole::Orchestrator {
        env.push(("AgentRegistry", platform.expert_agent_registry.clone()));
    }
    env.extend([
        ("Agent_Name", agent.spec.agent_card.name.clone()),
        ("Agent_Description", agent.spec.agent_card.description.clone()),
        ("DD_NAMESPACE", inputs.names.namespace.clone()),
        ("Data_Descriptor", selected_descriptors(agent).join(",")),
        ("DataServicesURL", platform.data_services_url.clone()),
        ("DescriptorTypes", inputs.descriptor_types.to_string()),
    ]);

    for (name, value) in [
        ("LANGFUSE_BASE_URL", &platform.observation_base_url),
        ("LANGFUSE_SECRET_KEY", &platform.observation_secret_key),
        ("LANGFUSE_PUBLIC_KEY", &platform.observation_public_key),
    ] {
        if let Some(value) = value {
            env.push((name, value.clone()));
        }
    }
    env
}

/// Command-line arguments of one agent process.
pub fn agent_args(inputs: &AgentInputs<'_>, role: AgentRole) -> Vec<String> {
    let model = inputs.model(role);
    let platform = inputs.platform;

    let mut args = vec![
        "--port".to_string(),
        role.port().to_string(),
        "--redis-host".to_string(),
        platform.redis_host.clone(),
        "--redis-port".to_string(),
        platform.redis_port.clone(),
        "--redis-db".to_string(),
        role.redis_db().to_string(),
        "--password".to_string(),
        platform.redis_password.clone(),
        "--provider".to_string(),
        model.provider.clone(),
        "--api-key".to_string(),
        model.api_key.clone(),
        "--base-url".to_string(),
        model.base_url.clone(),
        "--model".to_string(),
        model.model.clone(),
    ];
    if role == AgentRole::Expert {
        args.push("--max-steps".to_string());
        args.push(inputs.agent.spec.expert_agent_max_steps.clone());
    }
    args
}

pub fn build_service(names: &AgentResourceNames, owner: &OwnerReference) -> Result<Service> {
    let labels = app_labels(names);
    let svc_json = json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {
            "name": names.service,
            "namespace": names.namespace,
            "labels": labels,
            "ownerReferences": [owner]
        },
        "spec": {
            "type": "ClusterIP",
            "ports": [
                {
                    "name": ORCHESTRATOR_CONTAINER,
                    "port": ORCHESTRATOR_PORT,
                    "targetPort": ORCHESTRATOR_PORT,
                    "protocol": "TCP"
                },
                {
                    "name": EXPERT_CONTAINER,
                    "port": EXPERT_PORT,
                    "targetPort": EXPERT_PORT,
                    "protocol": "TCP"
                }
            ],
            "selector": labels
        }
    });
    Ok(serde_json::from_value(svc_json)?)
}

/// The skills `ConfigMap`, or `None` when the agent card declares no skills.
pub fn build_skills_config_map(
    agent: &DataAgentContainer,
    names: &AgentResourceNames,
    owner: &OwnerReference,
) -> Result<Option<ConfigMap>> {
    if agent.spec.agent_card.skills.is_empty() {
        return Ok(None);
    }
    let skills = serde_json::to_string(&agent.spec.agent_card.skills)?;
    let cm_json = json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": names.skills,
            "namespace": names.namespace,
            "labels": app_labels(names),
            "ownerReferences": [owner]
        },
        "data": { SKILLS_KEY: skills }
    });
    Ok(Some(serde_json::from_value(cm_json)?))
}

fn container_json(inputs: &AgentInputs<'_>, role: AgentRole) -> Value {
    let env: Vec<Value> = agent_env(inputs, role)
        .into_iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect();

    let mut container = json!({
        "name": role.container_name(),
        "image": inputs.image(role),
        "imagePullPolicy": "IfNotPresent",
        "args": agent_args(inputs, role),
        "ports": [{
            "name": role.container_name(),
            "containerPort": role.port(),
            "protocol": "TCP"
        }],
        "env": env,
        "resources": {
            "limits": { "cpu": "2000m", "memory": "8000Mi" },
            "requests": { "cpu": "100m", "memory": "1000Mi" }
        }
    });
    if inputs.has_skills() {
        container["volumeMounts"] = json!([{
            "name": SKILLS_VOLUME,
            "mountPath": SKILLS_MOUNT_PATH,
            "subPath": SKILLS_KEY
        }]);
    }
    container
}

pub fn build_deployment(inputs: &AgentInputs<'_>, owner: &OwnerReference) -> Result<Deployment> {
    let names = inputs.names;
    let labels = app_labels(names);

    let mut pod_spec = json!({
        "containers": [
            container_json(inputs, AgentRole::Orchestrator),
            container_json(inputs, AgentRole::Expert)
        ]
    });
    if inputs.has_skills() {
        pod_spec["volumes"] = json!([{
            "name": SKILLS_VOLUME,
            "configMap": { "name": names.skills }
        }]);
    }

    let deployment_json = json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": names.deployment,
            "namespace": names.namespace,
            "labels": labels,
            "ownerReferences": [owner]
        },
        "spec": {
            "replicas": 1,
            "strategy": { "type": "RollingUpdate" },
            "selector": { "matchLabels": labels },
            "template": {
                "metadata": { "labels": labels },
                "spec": pod_spec
            }
        }
    });
    Ok(serde_json::from_value(deployment_json)?)
}
