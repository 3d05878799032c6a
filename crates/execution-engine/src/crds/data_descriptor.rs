//! `DataDescriptor` Custom Resource Definition for external data sources

use super::condition::Condition;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Supported source kinds
pub const DATA_SOURCE_MYSQL: &str = "mysql";
pub const DATA_SOURCE_POSTGRES: &str = "postgres";
pub const DATA_SOURCE_MINIO: &str = "minio";
pub const DATA_SOURCE_FILESERVER: &str = "fileserver";

/// Overall phase values
pub const PHASE_READY: &str = "Ready";
pub const PHASE_NOT_READY: &str = "NotReady";

/// Table/query selectors for relational sources
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq)]
pub struct ExtractConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub querys: Vec<String>,
}

/// Reference to the `ConfigMap` holding few-shot examples and background knowledge
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq)]
pub struct PromptsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<PromptsReference>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq)]
pub struct PromptsReference {
    #[serde(default)]
    pub name: String,
}

impl PromptsConfig {
    /// Name of the referenced prompt `ConfigMap`, if any.
    #[must_use]
    pub fn config_map_name(&self) -> Option<&str> {
        self.prompts
            .as_ref()
            .map(|p| p.name.trim())
            .filter(|name| !name.is_empty())
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq)]
pub struct ProcessingConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cleaning: Vec<CleaningRule>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq)]
pub struct CleaningRule {
    pub rule: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

/// Domain/category placement of ingested data
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq)]
pub struct Classification {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<BTreeMap<String, Vec<String>>>,
}

/// One external data source
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq)]
pub struct DataSource {
    /// Source kind (mysql, postgres, minio, fileserver)
    #[serde(rename = "type")]
    pub source_type: String,

    pub name: String,

    /// Connection metadata such as host, port and credentials
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<PromptsConfig>,

    #[serde(default)]
    pub processing: ProcessingConfig,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classification: Vec<Classification>,
}

/// `DataDescriptor` CRD: data sources to ingest for agents
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(group = "dac.dac.io", version = "v1alpha1", kind = "DataDescriptor")]
#[kube(namespaced)]
#[kube(status = "DataDescriptorStatus")]
#[kube(shortname = "dd")]
#[kube(printcolumn = r#"{"name":"Type","type":"string","jsonPath":".spec.descriptorType"}"#)]
#[kube(printcolumn = r#"{"name":"Phase","type":"string","jsonPath":".status.overallPhase"}"#)]
#[kube(printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#)]
#[serde(rename_all = "camelCase")]
pub struct DataDescriptorSpec {
    pub descriptor_type: String,

    #[serde(default)]
    pub sources: Vec<DataSource>,
}

/// Observed state of one declared source
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    pub name: String,

    /// Plain-text phase (Ready, STARTED, PENDING, RETRY, FAILURE, REVOKED, OTHERS, Invalid, Unknown, Error)
    #[serde(default)]
    pub phase: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_time: Option<String>,

    #[serde(default)]
    pub records: i64,

    #[serde(default, rename = "taskID")]
    pub task_id: String,
}

impl SourceStatus {
    /// Equality that ignores `last_sync_time`.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.name == other.name
            && self.phase == other.phase
            && self.records == other.records
            && self.task_id == other.task_id
    }
}

/// Back-reference to a consumer of this descriptor
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq, Eq)]
pub struct ObjectReference {
    pub name: String,
    pub namespace: String,
}

/// Status of the `DataDescriptor`
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataDescriptorStatus {
    #[serde(default)]
    pub source_statuses: Vec<SourceStatus>,

    /// Maintained by the agent side; never written by the execution engine
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumed_by: Vec<ObjectReference>,

    #[serde(default)]
    pub overall_phase: String,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl DataDescriptorStatus {
    /// Find the recorded status of a source by name.
    #[must_use]
    pub fn source(&self, name: &str) -> Option<&SourceStatus> {
        self.source_statuses.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_spec_round_trips_wire_names() {
        let source: DataSource = serde_json::from_value(serde_json::json!({
            "type": "mysql",
            "name": "orders",
            "metadata": { "host": "mysql.db", "port": "3306" },
            "extract": { "tables": ["orders"] },
            "prompts": { "prompts": { "name": "orders-prompts" } },
            "processing": { "cleaning": [{ "rule": "dedupe", "params": { "key": "id" } }] },
            "classification": [{
                "domain": "sales",
                "category": "orders",
                "subcategory": "online",
                "tags": [{ "region": ["eu", "us"] }]
            }]
        }))
        .unwrap();

        assert_eq!(source.source_type, DATA_SOURCE_MYSQL);
        assert_eq!(
            source.prompts.as_ref().and_then(PromptsConfig::config_map_name),
            Some("orders-prompts")
        );
        assert_eq!(source.processing.cleaning[0].params["key"], "id");
        assert_eq!(source.classification[0].tags[0]["region"], vec!["eu", "us"]);
    }

    #[test]
    fn source_status_serializes_task_id_field() {
        let status = SourceStatus {
            name: "orders".to_string(),
            phase: PHASE_READY.to_string(),
            last_sync_time: None,
            records: 10,
            task_id: "abc".to_string(),
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["taskID"], "abc");
        assert!(value.get("lastSyncTime").is_none());
    }

    #[test]
    fn blank_prompt_reference_is_ignored() {
        let prompts = PromptsConfig {
            prompts: Some(PromptsReference {
                name: "  ".to_string(),
            }),
        };
        assert_eq!(prompts.config_map_name(), None);
    }
}
