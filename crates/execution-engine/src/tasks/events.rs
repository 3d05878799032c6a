//! Kubernetes events raised against DAC resources.
//!
//! Events are best-effort: publication failures are logged and never fail a
//! reconciliation. Every event is also mirrored to `tracing`.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ObjectReference;
use kube::runtime::events::{Event, EventType, Recorder, Reporter};
use kube::Client;
use tracing::{info, warn};

pub const REASON_SOURCE_HEALTHY: &str = "SourceHealthy";
pub const REASON_SOURCE_UNHEALTHY: &str = "SourceUnhealthy";
pub const REASON_SOURCE_SYNC_SUCCESS: &str = "SourceSyncSuccess";
pub const REASON_SOURCE_SYNC_FAILED: &str = "SourceSyncFailed";
pub const REASON_ALL_SOURCES_HEALTHY: &str = "AllSourcesHealthy";
pub const REASON_SOME_SOURCES_NOT_READY: &str = "SomeSourcesTaskErrorOrNotReady";
pub const REASON_CREATED: &str = "Created";
pub const REASON_UPDATED: &str = "Updated";
pub const REASON_DELETED: &str = "Deleted";

/// Severity of a resource event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSeverity {
    Normal,
    Warning,
}

/// An event to record against a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEvent {
    pub severity: EventSeverity,
    pub reason: String,
    pub message: String,
    pub action: String,
}

impl ResourceEvent {
    pub fn normal(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: EventSeverity::Normal,
            reason: reason.into(),
            message: message.into(),
            action: "Reconcile".to_string(),
        }
    }

    pub fn warning(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: EventSeverity::Warning,
            reason: reason.into(),
            message: message.into(),
            action: "Reconcile".to_string(),
        }
    }

    /// `<ConditionType>ConditionChanged`
    pub fn condition_changed(condition_type: &str, status: &str, message: &str) -> Self {
        Self::normal(
            format!("{condition_type}ConditionChanged"),
            format!("Condition {condition_type} is now {status}: {message}"),
        )
    }

    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }
}

#[async_trait]
pub trait EventEmitter: Send + Sync {
    async fn emit(&self, target: &ObjectReference, event: ResourceEvent);
}

fn trace_event(target: &ObjectReference, event: &ResourceEvent) {
    let name = target.name.as_deref().unwrap_or_default();
    let namespace = target.namespace.as_deref().unwrap_or_default();
    match event.severity {
        EventSeverity::Normal => info!(
            resource = %name,
            namespace = %namespace,
            reason = %event.reason,
            "{}",
            event.message
        ),
        EventSeverity::Warning => warn!(
            resource = %name,
            namespace = %namespace,
            reason = %event.reason,
            "{}",
            event.message
        ),
    }
}

/// [`EventEmitter`] that writes `events.k8s.io` events through a kube [`Recorder`]
#[derive(Clone)]
pub struct KubeEventEmitter {
    recorder: Recorder,
}

impl KubeEventEmitter {
    #[must_use]
    pub fn new(client: Client, controller: &str) -> Self {
        let reporter = Reporter {
            controller: controller.to_string(),
            instance: std::env::var("POD_NAME").ok(),
        };
        Self {
            recorder: Recorder::new(client, reporter),
        }
    }
}

#[async_trait]
impl EventEmitter for KubeEventEmitter {
    async fn emit(&self, target: &ObjectReference, event: ResourceEvent) {
        trace_event(target, &event);

        let type_ = match event.severity {
            EventSeverity::Normal => EventType::Normal,
            EventSeverity::Warning => EventType::Warning,
        };
        let kube_event = Event {
            type_,
            reason: event.reason,
            note: Some(event.message),
            action: event.action,
            secondary: None,
        };
        if let Err(e) = self.recorder.publish(&kube_event, target).await {
            warn!(error = %e, "Failed to publish event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_changed_reason_is_prefixed_by_type() {
        let event = ResourceEvent::condition_changed("Available", "True", "All data sources healthy.");
        assert_eq!(event.reason, "AvailableConditionChanged");
        assert_eq!(event.severity, EventSeverity::Normal);
    }

    #[test]
    fn action_can_be_overridden() {
        let event = ResourceEvent::normal(REASON_DELETED, "gone").with_action("Delete");
        assert_eq!(event.action, "Delete");
    }
}
