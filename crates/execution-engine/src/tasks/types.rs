use super::cluster::ClusterResources;
use super::config::ControllerConfig;
use super::events::EventEmitter;
use super::task_queue::{TaskQueue, TaskQueueError};
use kube::Client;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("model config {name} not found in namespace {namespace}")]
    ModelConfigMissing { name: String, namespace: String },

    #[error("data descriptor {name} not found in namespace {namespace}")]
    DataDescriptorMissing { name: String, namespace: String },

    #[error("failed to trigger task for source {source_name}: {source}")]
    TriggerFailed {
        source_name: String,
        #[source]
        source: TaskQueueError,
    },

    #[error("Task queue error: {0}")]
    TaskQueue(#[from] TaskQueueError),

    #[error("{}", SourceErrors(.0))]
    SourceSync(Vec<SourceError>),

    #[error("Missing object key")]
    MissingObjectKey,

    #[error("Reconciliation cancelled")]
    Cancelled,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure attributed to one declared data source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub source_name: String,
    pub message: String,
}

impl SourceError {
    pub fn new(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data source {} error: {}", self.source_name, self.message)
    }
}

struct SourceErrors<'a>(&'a [SourceError]);

impl fmt::Display for SourceErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} errors: [", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{err}")?;
        }
        f.write_str("]")
    }
}

/// Finalizer that guarantees the ingestion service hears about descriptor deletion
pub const DESCRIPTOR_FINALIZER_NAME: &str = "datadescriptors.dac.dac.io/finalizer";

/// Shared, read-only state handed to every reconciliation
pub struct Context {
    pub client: Client,
    pub config: Arc<ControllerConfig>,
    pub cluster: Arc<dyn ClusterResources>,
    pub task_queue: Arc<dyn TaskQueue>,
    pub events: Arc<dyn EventEmitter>,
    pub shutdown: CancellationToken,
}

/// Race `fut` against `token`, returning [`Error::Cancelled`] if the token fires first.
pub async fn cancellable<F>(token: &CancellationToken, fut: F) -> Result<F::Output>
where
    F: Future,
{
    tokio::select! {
        biased;
        () = token.cancelled() => Err(Error::Cancelled),
        output = fut => Ok(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregated_source_errors_list_every_source() {
        let err = Error::SourceSync(vec![
            SourceError::new("orders", "MySQL host not configured in metadata"),
            SourceError::new("files", "task t-1 failed: boom"),
        ]);

        assert_eq!(
            err.to_string(),
            "2 errors: [data source orders error: MySQL host not configured in metadata, \
             data source files error: task t-1 failed: boom]"
        );
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();

        let result = cancellable(&token, std::future::pending::<()>()).await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn live_token_passes_output_through() {
        let token = CancellationToken::new();
        let result = cancellable(&token, async { 7 }).await;
        assert_eq!(result.ok(), Some(7));
    }
}
