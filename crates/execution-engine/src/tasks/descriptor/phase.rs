//! Per-source phase state machine.
//!
//! A source with a recorded task id is polled and the remote celery state is mapped
//! onto a local phase. A source without one gets a type-specific connectivity probe.

use crate::crds::{
    DataSource, DATA_SOURCE_FILESERVER, DATA_SOURCE_MINIO, DATA_SOURCE_MYSQL,
    DATA_SOURCE_POSTGRES,
};
use crate::tasks::task_queue::TaskStatusResponse;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePhase {
    Ready,
    Started,
    Pending,
    Retry,
    Failure,
    Revoked,
    Others,
    Invalid,
    Unknown,
    Error,
}

impl SourcePhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Started => "STARTED",
            Self::Pending => "PENDING",
            Self::Retry => "RETRY",
            Self::Failure => "FAILURE",
            Self::Revoked => "REVOKED",
            Self::Others => "OTHERS",
            Self::Invalid => "Invalid",
            Self::Unknown => "Unknown",
            Self::Error => "Error",
        }
    }

    #[must_use]
    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }
}

impl fmt::Display for SourcePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a source's phase came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOrigin {
    Task,
    Probe,
}

/// Resolved state of one source for the current pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceResolution {
    pub phase: SourcePhase,
    /// Task id to record; empty means the next pass triggers again
    pub task_id: String,
    /// Record count reported by this pass; `None` keeps the previous value
    pub records: Option<i64>,
    pub error: Option<String>,
    pub origin: PhaseOrigin,
}

impl SourceResolution {
    fn task(phase: SourcePhase, task_id: &str) -> Self {
        Self {
            phase,
            task_id: task_id.to_string(),
            records: None,
            error: None,
            origin: PhaseOrigin::Task,
        }
    }

    fn probe(phase: SourcePhase, records: Option<i64>, error: Option<String>) -> Self {
        Self {
            phase,
            task_id: String::new(),
            records,
            error,
            origin: PhaseOrigin::Probe,
        }
    }

    #[must_use]
    fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }
}

/// Map a remote task state onto a local phase. Matching is case-insensitive.
#[must_use]
pub fn map_task_status(task_id: &str, response: &TaskStatusResponse) -> SourceResolution {
    match response.status.to_ascii_uppercase().as_str() {
        "SUCCESS" => SourceResolution::task(SourcePhase::Ready, task_id),
        "STARTED" => SourceResolution::task(SourcePhase::Started, task_id),
        "PENDING" => SourceResolution::task(SourcePhase::Pending, task_id),
        "REVOKED" => SourceResolution::task(SourcePhase::Revoked, task_id),
        "RETRY" => SourceResolution::task(SourcePhase::Retry, task_id)
            .with_error(format!("failed to check task status, task {task_id} retry")),
        // The task id is dropped so the next pass submits a fresh ingestion job
        "FAILURE" => SourceResolution::task(SourcePhase::Failure, "").with_error(format!(
            "task {task_id} failed: {}",
            response.result_text()
        )),
        _ => SourceResolution::task(SourcePhase::Others, task_id),
    }
}

/// A status poll that never reached the task queue.
#[must_use]
pub fn poll_failed(task_id: &str, error: &impl fmt::Display) -> SourceResolution {
    SourceResolution::task(SourcePhase::Error, task_id)
        .with_error(format!("failed to check task status: {error}"))
}

/// Validate connection metadata for a source that has no ingestion task.
#[must_use]
pub fn probe_source(source: &DataSource) -> SourceResolution {
    if source.name.is_empty() {
        return SourceResolution::probe(
            SourcePhase::Invalid,
            None,
            Some("data source name cannot be empty".to_string()),
        );
    }

    let (kind, records) = match source.source_type.as_str() {
        DATA_SOURCE_MYSQL => ("MySQL", 5000),
        DATA_SOURCE_POSTGRES => ("Postgres", 5000),
        DATA_SOURCE_MINIO => ("MinIO", 200),
        DATA_SOURCE_FILESERVER => ("Fileserver", 200),
        other => {
            return SourceResolution::probe(
                SourcePhase::Unknown,
                None,
                Some(format!("unknown data source type: {other}")),
            )
        }
    };

    let has_host = source
        .metadata
        .get("host")
        .is_some_and(|host| !host.is_empty());
    if !has_host {
        return SourceResolution::probe(
            SourcePhase::Invalid,
            None,
            Some(format!("{kind} host not configured in metadata")),
        );
    }
    SourceResolution::probe(SourcePhase::Ready, Some(records), None)
}
