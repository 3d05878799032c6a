use k8s_openapi::api::core::v1::ConfigMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Default location of the mounted controller configuration
pub const DEFAULT_CONFIG_PATH: &str = "/config/config.yaml";

/// Main controller configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfig {
    /// Namespace to watch; all namespaces when unset
    #[serde(default)]
    pub watch_namespace: Option<String>,

    #[serde(default)]
    pub task_queue: TaskQueueConfig,

    #[serde(default)]
    pub platform: PlatformLocation,

    #[serde(default)]
    pub reconcile: ReconcileConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Celery HTTP server the ingestion tasks are submitted to
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQueueConfig {
    #[serde(default = "default_task_queue_url")]
    pub base_url: String,

    #[serde(default = "default_task_queue_timeout")]
    pub timeout_seconds: u64,
}

fn default_task_queue_url() -> String {
    std::env::var("TASK_QUEUE_URL")
        .unwrap_or_else(|_| "http://celery-httpserver.dac.svc.cluster.local:8000".to_string())
}

fn default_task_queue_timeout() -> u64 {
    30
}

impl Default for TaskQueueConfig {
    fn default() -> Self {
        Self {
            base_url: default_task_queue_url(),
            timeout_seconds: default_task_queue_timeout(),
        }
    }
}

impl TaskQueueConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Where the platform-wide `ConfigMap` lives
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformLocation {
    #[serde(default = "default_platform_name")]
    pub config_map_name: String,

    #[serde(default = "default_platform_namespace")]
    pub config_map_namespace: String,
}

fn default_platform_name() -> String {
    "dac-configuration".to_string()
}

fn default_platform_namespace() -> String {
    "dac".to_string()
}

impl Default for PlatformLocation {
    fn default() -> Self {
        Self {
            config_map_name: default_platform_name(),
            config_map_namespace: default_platform_namespace(),
        }
    }
}

/// Requeue timing for the controller loops
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileConfig {
    /// How often a NotReady descriptor is polled again
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Backoff after a failed reconciliation
    #[serde(default = "default_error_requeue")]
    pub error_requeue_seconds: u64,
}

fn default_poll_interval() -> u64 {
    30
}

fn default_error_requeue() -> u64 {
    60
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            error_requeue_seconds: default_error_requeue(),
        }
    }
}

impl ReconcileConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    #[must_use]
    pub fn error_requeue(&self) -> Duration {
        Duration::from_secs(self.error_requeue_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl ControllerConfig {
    /// Validate that configuration has required fields
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let url = self.task_queue.base_url.trim();
        if url.is_empty() {
            return Err(anyhow::anyhow!("taskQueue.baseUrl must not be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "taskQueue.baseUrl must be an http(s) URL, got '{url}'"
            ));
        }
        if self.task_queue.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("taskQueue.timeoutSeconds must be positive"));
        }
        if self.platform.config_map_name.trim().is_empty()
            || self.platform.config_map_namespace.trim().is_empty()
        {
            return Err(anyhow::anyhow!(
                "platform.configMapName and platform.configMapNamespace must be set"
            ));
        }
        if self.reconcile.poll_interval_seconds == 0 || self.reconcile.error_requeue_seconds == 0 {
            return Err(anyhow::anyhow!("reconcile intervals must be positive"));
        }
        self.server
            .bind_address
            .parse::<std::net::SocketAddr>()
            .map_err(|e| {
                anyhow::anyhow!("server.bindAddress '{}' is invalid: {e}", self.server.bind_address)
            })?;
        Ok(())
    }

    /// Load configuration from mounted ConfigMap file
    pub fn from_mounted_file(config_path: &str) -> Result<Self, anyhow::Error> {
        let config_str = std::fs::read_to_string(config_path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {config_path}: {e}"))?;

        serde_yaml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse config YAML: {e}"))
    }

    /// Path of the mounted config file, honoring `CONTROLLER_CONFIG_PATH`.
    #[must_use]
    pub fn config_path() -> String {
        std::env::var("CONTROLLER_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }
}

/// Platform-wide settings resolved from the `dac-configuration` `ConfigMap`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    pub observation_base_url: Option<String>,
    pub observation_secret_key: Option<String>,
    pub observation_public_key: Option<String>,
    pub redis_host: String,
    pub redis_port: String,
    pub redis_password: String,
    pub data_services_url: String,
    pub expert_agent_registry: String,
    pub orchestrator_agent_image: String,
    pub expert_agent_image: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            observation_base_url: None,
            observation_secret_key: None,
            observation_public_key: None,
            redis_host: "redis-server.dac.svc.cluster.local".to_string(),
            redis_port: "6379".to_string(),
            redis_password: "123".to_string(),
            data_services_url: "http://data-services.dac.svc.cluster.local:8000".to_string(),
            expert_agent_registry: "http://expert-registry.dac.svc.cluster.local:8000".to_string(),
            orchestrator_agent_image:
                "registry.cn-shanghai.aliyuncs.com/jamesxiong/orchestrator-agent:v0.2.0-amd64"
                    .to_string(),
            expert_agent_image:
                "registry.cn-shanghai.aliyuncs.com/jamesxiong/expert-agent:v0.2.0-amd64"
                    .to_string(),
        }
    }
}

impl PlatformConfig {
    /// Overlay non-empty keys of the platform `ConfigMap` on the defaults.
    #[must_use]
    pub fn from_config_map(config_map: Option<&ConfigMap>) -> Self {
        let mut config = Self::default();
        let Some(data) = config_map.and_then(|cm| cm.data.as_ref()) else {
            return config;
        };

        let overlay = |target: &mut String, key: &str| {
            if let Some(value) = non_empty(data, key) {
                *target = value;
            }
        };
        overlay(&mut config.redis_host, "redis-host");
        overlay(&mut config.redis_port, "redis-port");
        overlay(&mut config.redis_password, "redis-password");
        overlay(&mut config.data_services_url, "data-services-url");
        overlay(&mut config.expert_agent_registry, "expert-agent-registry");
        overlay(&mut config.orchestrator_agent_image, "orchestrator-agent-image");
        overlay(&mut config.expert_agent_image, "expert-agent-image");

        config.observation_base_url = non_empty(data, "observation-base-url");
        config.observation_secret_key = non_empty(data, "observation-secret-key");
        config.observation_public_key = non_empty(data, "observation-public-key");
        config
    }
}

/// LLM connection settings from a per-model `ConfigMap`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelConfig {
    pub provider: String,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl ModelConfig {
    #[must_use]
    pub fn from_config_map(config_map: &ConfigMap) -> Self {
        let empty = BTreeMap::new();
        let data = config_map.data.as_ref().unwrap_or(&empty);
        let get = |key: &str| data.get(key).cloned().unwrap_or_default();
        Self {
            provider: get("provider"),
            api_key: get("api-key"),
            base_url: get("base-url"),
            model: get("model"),
        }
    }
}

fn non_empty(data: &BTreeMap<String, String>, key: &str) -> Option<String> {
    data.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
