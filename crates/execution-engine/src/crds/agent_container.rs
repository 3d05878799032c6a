//! `DataAgentContainer` Custom Resource Definition for deployable data agents

use super::condition::Condition;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which data descriptors the agent may draw from
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataPolicy {
    /// Ordered data descriptor names, resolved in the agent's namespace
    #[serde(default)]
    pub source_name_selector: Vec<String>,
}

/// Public description of the agent
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq)]
pub struct AgentCard {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<AgentSkill>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq)]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Names of the per-model `ConfigMaps` (keys: provider, api-key, base-url, model)
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq)]
pub struct ModelSpec {
    #[serde(default)]
    pub embedding: String,
    #[serde(rename = "expertLLM")]
    pub expert_llm: String,
    #[serde(rename = "plannerLLM")]
    pub planner_llm: String,
}

/// `DataAgentContainer` CRD: an orchestrator + expert agent pair bound to data descriptors
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(group = "dac.dac.io", version = "v1alpha1", kind = "DataAgentContainer")]
#[kube(namespaced)]
#[kube(status = "DataAgentContainerStatus")]
#[kube(shortname = "dac")]
#[kube(printcolumn = r#"{"name":"Agent","type":"string","jsonPath":".spec.agentCard.name"}"#)]
#[kube(printcolumn = r#"{"name":"Endpoint","type":"string","jsonPath":".status.endpoint.address"}"#)]
#[kube(printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#)]
#[serde(rename_all = "camelCase")]
pub struct DataAgentContainerSpec {
    #[serde(default)]
    pub data_policy: DataPolicy,

    pub agent_card: AgentCard,

    pub model: ModelSpec,

    /// Iteration bound for the expert agent, passed through verbatim
    #[serde(default)]
    pub expert_agent_max_steps: String,
}

/// Data descriptor actually wired into a running agent
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveDataDescriptor {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub last_synced: String,
}

/// How to reach the agent
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq, Eq)]
pub struct Endpoint {
    pub address: String,
    pub port: i32,
    pub protocol: String,
}

/// Status of the `DataAgentContainer`
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataAgentContainerStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active_data_descriptors: Vec<ActiveDataDescriptor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}
