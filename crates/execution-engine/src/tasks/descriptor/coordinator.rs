//! # Source sync coordination
//!
//! Drives every declared source of a `DataDescriptor` through ingestion:
//!
//! 1. sources without a recorded task id get an `AddOrUpdate` job
//! 2. every source is resolved, by polling its task or probing its metadata
//! 3. a fresh status is built and written only when it differs from the observed one
//! 4. per-source errors are handed back after the write

use super::phase::{map_task_status, poll_failed, probe_source, PhaseOrigin, SourceResolution};
use super::prompts::load_prompts;
use super::status::{
    apply_conditions, mark_initializing, source_status, status_equivalent, Aggregate,
    ConditionFlip,
};
use crate::crds::{DataDescriptor, DataDescriptorStatus, DataSource};
use crate::tasks::cluster::ClusterResources;
use crate::tasks::events::{
    EventEmitter, ResourceEvent, REASON_ALL_SOURCES_HEALTHY, REASON_DELETED,
    REASON_SOME_SOURCES_NOT_READY, REASON_SOURCE_HEALTHY, REASON_SOURCE_SYNC_FAILED,
    REASON_SOURCE_SYNC_SUCCESS, REASON_SOURCE_UNHEALTHY,
};
use crate::tasks::task_queue::{
    DescriptorIdentity, Operation, SourceIdentity, TaskPayload, TaskQueue, TriggerRequest,
};
use crate::tasks::types::{cancellable, Error, Result, SourceError};
use chrono::Utc;
use k8s_openapi::api::core::v1::ObjectReference;
use kube::{Resource, ResourceExt};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Result of one coordination pass
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub status: DataDescriptorStatus,
    pub status_written: bool,
    pub errors: Vec<SourceError>,
}

impl SyncOutcome {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status.overall_phase == crate::crds::PHASE_READY
    }

    /// Surface per-source errors as [`Error::SourceSync`].
    pub fn into_result(self) -> Result<Self> {
        if self.errors.is_empty() {
            Ok(self)
        } else {
            Err(Error::SourceSync(self.errors))
        }
    }
}

pub struct SourceSyncCoordinator<'a> {
    pub cluster: &'a dyn ClusterResources,
    pub task_queue: &'a dyn TaskQueue,
    pub events: &'a dyn EventEmitter,
    pub cancel: &'a CancellationToken,
}

struct Resolved<'s> {
    source: &'s DataSource,
    resolution: SourceResolution,
}

impl SourceSyncCoordinator<'_> {
    pub async fn reconcile(&self, descriptor: &DataDescriptor) -> Result<SyncOutcome> {
        let name = descriptor.name_any();
        let namespace = descriptor.namespace().unwrap_or_default();
        let observed = descriptor.status.clone().unwrap_or_default();

        let task_ids = self.trigger_pending(descriptor, &observed).await?;

        let mut resolved = Vec::with_capacity(descriptor.spec.sources.len());
        for (source, task_id) in descriptor.spec.sources.iter().zip(&task_ids) {
            let resolution = self.resolve(source, task_id).await?;
            resolved.push(Resolved { source, resolution });
        }

        let now = Utc::now().to_rfc3339();
        let aggregate = Aggregate::collect(
            resolved
                .iter()
                .map(|r| (r.source.name.as_str(), &r.resolution)),
        );
        let mut status = DataDescriptorStatus {
            source_statuses: resolved
                .iter()
                .map(|r| {
                    source_status(
                        &r.source.name,
                        observed.source(&r.source.name),
                        &r.resolution,
                        &now,
                    )
                })
                .collect(),
            consumed_by: observed.consumed_by.clone(),
            overall_phase: aggregate.overall_phase().to_string(),
            conditions: observed.conditions.clone(),
        };
        let mut flips: Vec<ConditionFlip> =
            mark_initializing(&mut status.conditions, &observed.overall_phase)
                .into_iter()
                .collect();
        flips.extend(apply_conditions(&mut status.conditions, &aggregate));

        let status_written = if status_equivalent(&observed, &status) {
            debug!(descriptor = %name, "Status unchanged, skipping update");
            false
        } else {
            let patch = json!({
                "status": {
                    "overallPhase": status.overall_phase,
                    "sourceStatuses": status.source_statuses,
                    "conditions": status.conditions
                }
            });
            cancellable(
                self.cancel,
                self.cluster.patch_descriptor_status(&namespace, &name, &patch),
            )
            .await??;
            info!(descriptor = %name, phase = %status.overall_phase, "Updated DataDescriptor status");
            true
        };

        self.publish_events(&descriptor.object_ref(&()), &resolved, &aggregate, &flips)
            .await;

        Ok(SyncOutcome {
            status,
            status_written,
            errors: aggregate.errors,
        })
    }

    /// Submit a job for every source lacking a task id. Returns ids in declared order.
    async fn trigger_pending(
        &self,
        descriptor: &DataDescriptor,
        observed: &DataDescriptorStatus,
    ) -> Result<Vec<String>> {
        let namespace = descriptor.namespace().unwrap_or_default();
        let mut task_ids = Vec::with_capacity(descriptor.spec.sources.len());

        for source in &descriptor.spec.sources {
            if let Some(existing) = observed
                .source(&source.name)
                .filter(|s| !s.task_id.is_empty())
            {
                debug!(source = %source.name, task_id = %existing.task_id, "Skipping source with existing task");
                task_ids.push(existing.task_id.clone());
                continue;
            }

            let prompts = load_prompts(self.cluster, self.cancel, &namespace, source).await?;
            let request = add_or_update_request(descriptor, source, prompts);
            let task_id = cancellable(self.cancel, self.task_queue.trigger(&request))
                .await?
                .map_err(|source_err| Error::TriggerFailed {
                    source_name: source.name.clone(),
                    source: source_err,
                })?;
            info!(source = %source.name, task_id = %task_id, "Successfully triggered task");
            task_ids.push(task_id);
        }
        Ok(task_ids)
    }

    async fn resolve(&self, source: &DataSource, task_id: &str) -> Result<SourceResolution> {
        if task_id.is_empty() {
            return Ok(probe_source(source));
        }
        let resolution = match cancellable(self.cancel, self.task_queue.status(task_id)).await? {
            Ok(response) => {
                debug!(source = %source.name, status = %response.status, "Task status");
                map_task_status(task_id, &response)
            }
            Err(e) => poll_failed(task_id, &e),
        };
        Ok(resolution)
    }

    async fn publish_events(
        &self,
        target: &ObjectReference,
        resolved: &[Resolved<'_>],
        aggregate: &Aggregate,
        flips: &[ConditionFlip],
    ) {
        for r in resolved {
            let name = &r.source.name;
            let event = match (&r.resolution.error, r.resolution.origin) {
                (Some(err), PhaseOrigin::Task) => ResourceEvent::warning(
                    REASON_SOURCE_SYNC_FAILED,
                    format!("Task for data source {name} failed: {err}"),
                ),
                (Some(err), PhaseOrigin::Probe) => ResourceEvent::warning(
                    REASON_SOURCE_UNHEALTHY,
                    format!("Data source {name} is unhealthy: {err}"),
                ),
                (None, _) if !r.resolution.phase.is_ready() => continue,
                (None, PhaseOrigin::Task) => ResourceEvent::normal(
                    REASON_SOURCE_SYNC_SUCCESS,
                    format!(
                        "Task {} completed for data source {name}",
                        r.resolution.task_id
                    ),
                ),
                (None, PhaseOrigin::Probe) => ResourceEvent::normal(
                    REASON_SOURCE_HEALTHY,
                    format!("Data source {name} is healthy"),
                ),
            };
            self.events.emit(target, event).await;
        }

        let summary = if aggregate.all_ready() {
            ResourceEvent::normal(REASON_ALL_SOURCES_HEALTHY, aggregate.summary())
        } else {
            ResourceEvent::warning(REASON_SOME_SOURCES_NOT_READY, aggregate.summary())
        };
        self.events.emit(target, summary).await;

        for flip in flips {
            self.events
                .emit(
                    target,
                    ResourceEvent::condition_changed(&flip.condition_type, &flip.status, &flip.message),
                )
                .await;
        }
    }

    /// Tell the ingestion service a descriptor is gone. Returns the delete task id.
    pub async fn delete(&self, descriptor: &DataDescriptor) -> Result<String> {
        let name = descriptor.name_any();
        let namespace = descriptor.namespace().unwrap_or_default();

        let request = TriggerRequest::delete(&namespace, &name);
        let task_id = cancellable(self.cancel, self.task_queue.trigger(&request)).await??;
        info!(descriptor = %name, task_id = %task_id, "Triggered delete task");

        self.events
            .emit(
                &descriptor.object_ref(&()),
                ResourceEvent::normal(
                    REASON_DELETED,
                    format!("Triggered delete task {task_id} for data descriptor {name}"),
                )
                .with_action("Delete"),
            )
            .await;
        Ok(task_id)
    }
}

fn add_or_update_request(
    descriptor: &DataDescriptor,
    source: &DataSource,
    prompts: Option<crate::tasks::task_queue::PromptPayload>,
) -> TriggerRequest {
    TriggerRequest {
        data: TaskPayload {
            operation: Operation::AddOrUpdate,
            source: Some(SourceIdentity {
                source_type: source.source_type.clone(),
                name: source.name.clone(),
                metadata: source.metadata.clone(),
            }),
            descriptor: DescriptorIdentity {
                name: descriptor.name_any(),
                namespace: descriptor.namespace().unwrap_or_default(),
            },
            extract: source.extract.clone(),
            prompts,
            processing: Some(source.processing.clone()),
            classification: Some(source.classification.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crds::{DataDescriptorSpec, PromptsConfig, PromptsReference, SourceStatus};
    use crate::tasks::events::EventSeverity;
    use crate::tasks::task_queue::{MockTaskQueue, TaskQueueError, TaskStatusResponse};
    use crate::tasks::testing::{FakeCluster, RecordingEmitter};
    use mockall::predicate::eq;

    const NS: &str = "team-a";

    fn source(name: &str, source_type: &str, host: Option<&str>) -> DataSource {
        DataSource {
            source_type: source_type.to_string(),
            name: name.to_string(),
            metadata: host
                .map(|h| [("host".to_string(), h.to_string())].into())
                .unwrap_or_default(),
            ..Default::default()
        }
    }

    fn descriptor(sources: Vec<DataSource>, status: Option<DataDescriptorStatus>) -> DataDescriptor {
        let mut dd = DataDescriptor::new(
            "sales-data",
            DataDescriptorSpec {
                descriptor_type: "sql".to_string(),
                sources,
            },
        );
        dd.metadata.namespace = Some(NS.to_string());
        dd.status = status;
        dd
    }

    fn recorded(name: &str, phase: &str, task_id: &str, records: i64) -> SourceStatus {
        SourceStatus {
            name: name.to_string(),
            phase: phase.to_string(),
            last_sync_time: Some("2025-01-01T00:00:00+00:00".to_string()),
            records,
            task_id: task_id.to_string(),
        }
    }

    fn task_status(status: &str) -> TaskStatusResponse {
        TaskStatusResponse {
            task_id: "t-1".to_string(),
            status: status.to_string(),
            result: serde_json::Value::Null,
        }
    }

    async fn run(
        cluster: &FakeCluster,
        queue: &MockTaskQueue,
        events: &RecordingEmitter,
        dd: &DataDescriptor,
    ) -> Result<SyncOutcome> {
        let cancel = CancellationToken::new();
        SourceSyncCoordinator {
            cluster,
            task_queue: queue,
            events,
            cancel: &cancel,
        }
        .reconcile(dd)
        .await
    }

    #[tokio::test]
    async fn mysql_without_host_is_invalid() {
        let cluster = FakeCluster::new();
        let mut queue = MockTaskQueue::new();
        queue
            .expect_trigger()
            .times(1)
            .returning(|_| Ok(String::new()));
        queue.expect_status().never();
        let events = RecordingEmitter::default();

        let dd = descriptor(vec![source("orders", "mysql", None)], None);
        let outcome = run(&cluster, &queue, &events, &dd).await.unwrap();

        assert_eq!(outcome.status.source_statuses[0].phase, "Invalid");
        assert_eq!(outcome.status.overall_phase, "NotReady");
        let err = outcome.into_result().unwrap_err();
        assert!(err.to_string().contains("host not configured"));
        assert!(events.reasons().contains(&REASON_SOURCE_UNHEALTHY.to_string()));
    }

    #[tokio::test]
    async fn recorded_task_is_polled_not_retriggered() {
        let cluster = FakeCluster::new();
        let mut queue = MockTaskQueue::new();
        queue.expect_trigger().never();
        queue
            .expect_status()
            .with(eq("t-1"))
            .times(1)
            .returning(|_| Ok(task_status("success")));
        let events = RecordingEmitter::default();

        let dd = descriptor(
            vec![source("orders", "mysql", Some("db"))],
            Some(DataDescriptorStatus {
                source_statuses: vec![recorded("orders", "STARTED", "t-1", 42)],
                overall_phase: "NotReady".to_string(),
                ..Default::default()
            }),
        );
        let outcome = run(&cluster, &queue, &events, &dd).await.unwrap();

        let status = &outcome.status.source_statuses[0];
        assert_eq!(status.phase, "Ready");
        assert_eq!(status.records, 42);
        assert_eq!(status.task_id, "t-1");
        assert_eq!(outcome.status.overall_phase, "Ready");
        assert!(outcome.errors.is_empty());
        assert!(outcome.status_written);
        assert!(events.reasons().contains(&REASON_SOURCE_SYNC_SUCCESS.to_string()));
        assert!(events.reasons().contains(&"AvailableConditionChanged".to_string()));
    }

    #[tokio::test]
    async fn statuses_align_with_declared_sources() {
        let cluster = FakeCluster::new();
        let mut queue = MockTaskQueue::new();
        queue
            .expect_trigger()
            .times(2)
            .returning(|request| Ok(format!("task-{}", request.data.source.as_ref().unwrap().name)));
        queue
            .expect_status()
            .returning(|_| Ok(task_status("PENDING")));
        let events = RecordingEmitter::default();

        let dd = descriptor(
            vec![
                source("zeta", "mysql", Some("db")),
                source("alpha", "minio", Some("s3")),
                source("mid", "postgres", Some("pg")),
            ],
            Some(DataDescriptorStatus {
                source_statuses: vec![recorded("alpha", "PENDING", "existing", 0)],
                ..Default::default()
            }),
        );
        let outcome = run(&cluster, &queue, &events, &dd).await.unwrap();

        let names: Vec<&str> = outcome
            .status
            .source_statuses
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        let ids: Vec<&str> = outcome
            .status
            .source_statuses
            .iter()
            .map(|s| s.task_id.as_str())
            .collect();
        assert_eq!(ids, vec!["task-zeta", "existing", "task-mid"]);
        assert_eq!(outcome.status.overall_phase, "NotReady");
    }

    #[tokio::test]
    async fn unchanged_status_is_not_rewritten() {
        let cluster = FakeCluster::new();
        let mut queue = MockTaskQueue::new();
        queue.expect_trigger().never();
        queue
            .expect_status()
            .returning(|_| Ok(task_status("SUCCESS")));
        let events = RecordingEmitter::default();

        let dd = descriptor(
            vec![source("orders", "mysql", Some("db"))],
            Some(DataDescriptorStatus {
                source_statuses: vec![recorded("orders", "STARTED", "t-1", 7)],
                ..Default::default()
            }),
        );
        let first = run(&cluster, &queue, &events, &dd).await.unwrap();
        assert!(first.status_written);

        let mut second_pass = dd.clone();
        let mut settled = first.status.clone();
        settled.source_statuses[0].last_sync_time = Some("2030-01-01T00:00:00+00:00".to_string());
        for condition in &mut settled.conditions {
            condition.last_transition_time = Some("2030-01-01T00:00:00+00:00".to_string());
        }
        second_pass.status = Some(settled);

        let second = run(&cluster, &queue, &events, &second_pass).await.unwrap();

        assert!(!second.status_written);
        assert_eq!(cluster.state().descriptor_status_patches.len(), 1);
    }

    #[tokio::test]
    async fn trigger_failure_aborts_before_status_write() {
        let cluster = FakeCluster::new();
        let mut queue = MockTaskQueue::new();
        queue.expect_trigger().times(1).returning(|_| {
            Err(TaskQueueError::UnexpectedStatus {
                status: 503,
                body: "unavailable".to_string(),
            })
        });
        queue.expect_status().never();
        let events = RecordingEmitter::default();

        let dd = descriptor(vec![source("orders", "mysql", Some("db"))], None);
        let err = run(&cluster, &queue, &events, &dd).await.unwrap_err();

        assert!(matches!(err, Error::TriggerFailed { ref source_name, .. } if source_name == "orders"));
        assert!(cluster.state().descriptor_status_patches.is_empty());
        assert!(events.events().is_empty());
    }

    #[tokio::test]
    async fn poll_failure_is_folded_into_errors_and_status_still_written() {
        let cluster = FakeCluster::new();
        let mut queue = MockTaskQueue::new();
        queue.expect_trigger().never();
        queue.expect_status().returning(|id| {
            if id == "bad" {
                Err(TaskQueueError::UnexpectedStatus {
                    status: 500,
                    body: "oops".to_string(),
                })
            } else {
                Ok(task_status("SUCCESS"))
            }
        });
        let events = RecordingEmitter::default();

        let dd = descriptor(
            vec![
                source("good", "mysql", Some("db")),
                source("broken", "mysql", Some("db")),
            ],
            Some(DataDescriptorStatus {
                source_statuses: vec![
                    recorded("good", "STARTED", "ok", 0),
                    recorded("broken", "STARTED", "bad", 0),
                ],
                ..Default::default()
            }),
        );
        let outcome = run(&cluster, &queue, &events, &dd).await.unwrap();

        assert_eq!(outcome.status.source_statuses[0].phase, "Ready");
        assert_eq!(outcome.status.source_statuses[1].phase, "Error");
        assert_eq!(outcome.status.source_statuses[1].task_id, "bad");
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(cluster.state().descriptor_status_patches.len(), 1);

        let warning = events
            .events()
            .into_iter()
            .find(|e| e.reason == REASON_SOME_SOURCES_NOT_READY)
            .unwrap();
        assert_eq!(warning.severity, EventSeverity::Warning);
        assert_eq!(
            warning.message,
            "0 data sources task not completed, 1 data sources have issues"
        );
    }

    #[tokio::test]
    async fn failed_task_drops_id_for_retrigger() {
        let cluster = FakeCluster::new();
        let mut queue = MockTaskQueue::new();
        queue.expect_trigger().never();
        queue.expect_status().returning(|_| {
            Ok(TaskStatusResponse {
                task_id: "t-1".to_string(),
                status: "FAILURE".to_string(),
                result: serde_json::json!("timeout"),
            })
        });
        let events = RecordingEmitter::default();

        let dd = descriptor(
            vec![source("orders", "mysql", Some("db"))],
            Some(DataDescriptorStatus {
                source_statuses: vec![recorded("orders", "STARTED", "t-1", 0)],
                ..Default::default()
            }),
        );
        let outcome = run(&cluster, &queue, &events, &dd).await.unwrap();

        assert_eq!(outcome.status.source_statuses[0].phase, "FAILURE");
        assert!(outcome.status.source_statuses[0].task_id.is_empty());
        assert!(outcome.errors[0].message.contains("timeout"));
    }

    #[tokio::test]
    async fn status_patch_leaves_consumers_untouched() {
        let cluster = FakeCluster::new();
        let mut queue = MockTaskQueue::new();
        queue.expect_trigger().returning(|_| Ok(String::new()));
        let events = RecordingEmitter::default();

        let dd = descriptor(
            vec![source("files", "fileserver", Some("fs"))],
            Some(DataDescriptorStatus {
                consumed_by: vec![crate::crds::ObjectReference {
                    name: "sales".to_string(),
                    namespace: NS.to_string(),
                }],
                ..Default::default()
            }),
        );
        let outcome = run(&cluster, &queue, &events, &dd).await.unwrap();

        assert_eq!(outcome.status.overall_phase, "Ready");
        assert_eq!(outcome.status.consumed_by.len(), 1);
        let state = cluster.state();
        let (_, name, patch) = &state.descriptor_status_patches[0];
        assert_eq!(name, "sales-data");
        assert!(patch["status"].get("consumedBy").is_none());
        assert_eq!(patch["status"]["sourceStatuses"][0]["records"], 200);
        assert_eq!(patch["status"]["conditions"][0]["type"], "Created");
        assert_eq!(
            patch["status"]["conditions"][0]["message"],
            "Initializing data descriptor"
        );
        assert!(events.reasons().contains(&REASON_SOURCE_HEALTHY.to_string()));
        assert!(events.reasons().contains(&REASON_ALL_SOURCES_HEALTHY.to_string()));
    }

    #[tokio::test]
    async fn trigger_carries_prompts_and_descriptor_identity() {
        let cluster = FakeCluster::new().with_config_map(
            NS,
            "orders-prompts",
            &[("fewshots.json", r#"[{"query":"q","answer":"a"}]"#)],
        );
        let mut queue = MockTaskQueue::new();
        queue
            .expect_trigger()
            .withf(|request| {
                let data = &request.data;
                data.operation == Operation::AddOrUpdate
                    && data.descriptor.name == "sales-data"
                    && data.descriptor.namespace == NS
                    && data
                        .prompts
                        .as_ref()
                        .is_some_and(|p| p.fewshots.len() == 1)
            })
            .times(1)
            .returning(|_| Ok("t-9".to_string()));
        queue
            .expect_status()
            .with(eq("t-9"))
            .returning(|_| Ok(task_status("STARTED")));
        let events = RecordingEmitter::default();

        let mut orders = source("orders", "mysql", Some("db"));
        orders.prompts = Some(PromptsConfig {
            prompts: Some(PromptsReference {
                name: "orders-prompts".to_string(),
            }),
        });
        let outcome = run(&cluster, &queue, &events, &descriptor(vec![orders], None))
            .await
            .unwrap();

        assert_eq!(outcome.status.source_statuses[0].phase, "STARTED");
    }

    #[tokio::test]
    async fn failed_status_write_is_surfaced_without_events() {
        let cluster = FakeCluster::new();
        cluster.state().fail_status_patch = true;
        let mut queue = MockTaskQueue::new();
        queue.expect_trigger().returning(|_| Ok(String::new()));
        let events = RecordingEmitter::default();

        let dd = descriptor(vec![source("files", "fileserver", Some("fs"))], None);
        let err = run(&cluster, &queue, &events, &dd).await.unwrap_err();

        assert!(matches!(err, Error::KubeError(_)));
        assert!(events.events().is_empty());
    }

    #[tokio::test]
    async fn cancellation_stops_before_status_write() {
        let cluster = FakeCluster::new();
        let mut queue = MockTaskQueue::new();
        queue.expect_trigger().never();
        queue
            .expect_status()
            .returning(|_| Ok(task_status("SUCCESS")));
        let events = RecordingEmitter::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let dd = descriptor(
            vec![source("orders", "mysql", Some("db"))],
            Some(DataDescriptorStatus {
                source_statuses: vec![recorded("orders", "STARTED", "t-1", 0)],
                ..Default::default()
            }),
        );
        let err = SourceSyncCoordinator {
            cluster: &cluster,
            task_queue: &queue,
            events: &events,
            cancel: &cancel,
        }
        .reconcile(&dd)
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert!(cluster.state().descriptor_status_patches.is_empty());
    }

    #[tokio::test]
    async fn delete_sends_identity_only_and_emits_event() {
        let mut queue = MockTaskQueue::new();
        queue
            .expect_trigger()
            .withf(|request| *request == TriggerRequest::delete(NS, "sales-data"))
            .times(1)
            .returning(|_| Ok("del-1".to_string()));
        let events = RecordingEmitter::default();
        let cluster = FakeCluster::new();
        let cancel = CancellationToken::new();

        let task_id = SourceSyncCoordinator {
            cluster: &cluster,
            task_queue: &queue,
            events: &events,
            cancel: &cancel,
        }
        .delete(&descriptor(vec![source("orders", "mysql", Some("db"))], None))
        .await
        .unwrap();

        assert_eq!(task_id, "del-1");
        assert_eq!(events.reasons(), vec![REASON_DELETED.to_string()]);
        assert!(cluster.state().descriptor_status_patches.is_empty());
    }
}
