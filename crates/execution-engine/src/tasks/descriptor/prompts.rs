//! Prompt material attached to ingestion jobs.

use crate::crds::DataSource;
use crate::tasks::cluster::ClusterResources;
use crate::tasks::task_queue::PromptPayload;
use crate::tasks::types::{cancellable, Result};
use k8s_openapi::api::core::v1::ConfigMap;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const FEWSHOTS_KEY: &str = "fewshots.json";
pub const BACKGROUND_KNOWLEDGE_KEY: &str = "background_knowledge.json";

/// Parse both prompt keys. Each key is optional and a malformed one is skipped on its own.
#[must_use]
pub fn parse_prompt_config_map(config_map: &ConfigMap) -> PromptPayload {
    let name = config_map.metadata.name.as_deref().unwrap_or_default();
    PromptPayload {
        fewshots: parse_key(config_map, name, FEWSHOTS_KEY),
        background_knowledge: parse_key(config_map, name, BACKGROUND_KNOWLEDGE_KEY),
    }
}

fn parse_key<T: DeserializeOwned>(config_map: &ConfigMap, name: &str, key: &str) -> Vec<T> {
    let Some(raw) = config_map
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .filter(|raw| !raw.trim().is_empty())
    else {
        return Vec::new();
    };
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(config_map = %name, key = %key, error = %e, "Failed to parse prompt data");
        Vec::new()
    })
}

/// Resolve the prompt payload for `source`.
///
/// `None` when the source references no prompt `ConfigMap`. A lookup failure is logged
/// and yields an empty payload; only cancellation is an error.
pub async fn load_prompts(
    cluster: &dyn ClusterResources,
    cancel: &CancellationToken,
    namespace: &str,
    source: &DataSource,
) -> Result<Option<PromptPayload>> {
    let Some(name) = source
        .prompts
        .as_ref()
        .and_then(|prompts| prompts.config_map_name())
    else {
        return Ok(None);
    };

    match cancellable(cancel, cluster.get_config_map(namespace, name)).await? {
        Ok(Some(config_map)) => {
            debug!(config_map = %name, source = %source.name, "Loaded prompt ConfigMap");
            Ok(Some(parse_prompt_config_map(&config_map)))
        }
        Ok(None) => {
            warn!(
                config_map = %name,
                namespace = %namespace,
                source = %source.name,
                "Prompt ConfigMap not found, triggering with empty prompts"
            );
            Ok(Some(PromptPayload::default()))
        }
        Err(e) => {
            warn!(
                config_map = %name,
                namespace = %namespace,
                source = %source.name,
                error = %e,
                "Failed to get prompt ConfigMap, triggering with empty prompts"
            );
            Ok(Some(PromptPayload::default()))
        }
    }
}
