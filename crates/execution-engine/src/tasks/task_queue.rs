//! # Ingestion task queue client
//!
//! Talks to the celery HTTP server that runs ingestion jobs: `POST /trigger_task`
//! submits a job and returns its id, `GET /task_status/{id}` reports progress.

use crate::crds::{Classification, ExtractConfig, ProcessingConfig};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, Url};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum TaskQueueError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status code: {status}, response: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid task queue base URL '{0}'")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    AddOrUpdate,
    Delete,
}

/// Body of `POST /trigger_task`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRequest {
    pub data: TaskPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceIdentity>,
    pub descriptor: DescriptorIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<PromptPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing: Option<ProcessingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Vec<Classification>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceIdentity {
    #[serde(rename = "type")]
    pub source_type: String,
    pub name: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorIdentity {
    pub name: String,
    pub namespace: String,
}

/// Few-shot examples and background knowledge shipped with an ingestion job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPayload {
    #[serde(default)]
    pub fewshots: Vec<FewShot>,
    #[serde(default)]
    pub background_knowledge: Vec<BackgroundKnowledge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FewShot {
    pub query: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundKnowledge {
    pub description: String,
}

impl TriggerRequest {
    /// A delete job carries only the descriptor identity.
    #[must_use]
    pub fn delete(namespace: &str, name: &str) -> Self {
        Self {
            data: TaskPayload {
                operation: Operation::Delete,
                source: None,
                descriptor: DescriptorIdentity {
                    name: name.to_string(),
                    namespace: namespace.to_string(),
                },
                extract: None,
                prompts: None,
                processing: None,
                classification: None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct TriggerResponse {
    task_id: String,
}

/// Body of `GET /task_status/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    #[serde(default)]
    pub task_id: String,
    pub status: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

impl TaskStatusResponse {
    /// The `result` field as text: strings verbatim, other JSON rendered compactly.
    #[must_use]
    pub fn result_text(&self) -> String {
        match &self.result {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Submit a job and return its task id.
    async fn trigger(&self, request: &TriggerRequest) -> Result<String, TaskQueueError>;

    /// Fetch the remote state of a previously submitted job.
    async fn status(&self, task_id: &str) -> Result<TaskStatusResponse, TaskQueueError>;
}

/// `reqwest`-backed [`TaskQueue`]
#[derive(Clone)]
pub struct HttpTaskQueue {
    http_client: HttpClient,
    base_url: Url,
}

impl HttpTaskQueue {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TaskQueueError> {
        let raw = base_url.into();
        let base_url = Url::parse(&raw)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or(TaskQueueError::InvalidBaseUrl(raw))?;
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Base URL with `segments` appended, each percent-encoded as one path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, TaskQueueError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TaskQueueError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl TaskQueue for HttpTaskQueue {
    #[instrument(skip(self, request), fields(operation = ?request.data.operation))]
    async fn trigger(&self, request: &TriggerRequest) -> Result<String, TaskQueueError> {
        let url = self.endpoint(&["trigger_task"]);
        let response = self.http_client.post(url).json(request).send().await?;
        let parsed: TriggerResponse = Self::read_json(response).await?;
        debug!(task_id = %parsed.task_id, "Task triggered");
        Ok(parsed.task_id)
    }

    #[instrument(skip(self))]
    async fn status(&self, task_id: &str) -> Result<TaskStatusResponse, TaskQueueError> {
        let url = self.endpoint(&["task_status", task_id]);
        let response = self.http_client.get(url).send().await?;
        Self::read_json(response).await
    }
}
