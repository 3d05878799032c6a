//! Status conditions shared by the DAC custom resources
//!
//! Conditions are keyed by their `type`: setting a condition replaces any existing
//! condition of the same type in place. The transition timestamp only moves when the
//! condition's `status` value flips; reason/message refreshes keep the old timestamp.

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Condition status values
pub const CONDITION_TRUE: &str = "True";
pub const CONDITION_FALSE: &str = "False";

/// Data descriptor: every source is ready
pub const CONDITION_AVAILABLE: &str = "Available";
/// Data descriptor: at least one source is not ready or errored
pub const CONDITION_NOT_READY: &str = "NotReady";
/// Data descriptor: first reconciliation has started
pub const CONDITION_CREATED: &str = "Created";
/// Agent container: child resources exist
pub const CONDITION_PROVISIONED: &str = "Provisioned";

/// Condition attached to a DAC resource status
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    #[serde(rename = "type")]
    pub condition_type: String,

    /// Status of the condition (True, False, or Unknown)
    pub status: String,

    /// Last time the condition transitioned (RFC3339 format)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,

    /// Machine-readable reason for the condition's last transition
    #[serde(default)]
    pub reason: String,

    /// Human-readable message about the condition
    #[serde(default)]
    pub message: String,
}

impl Condition {
    /// Build a condition stamped with the current time.
    pub fn new(
        condition_type: impl Into<String>,
        status: &str,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            condition_type: condition_type.into(),
            status: status.to_string(),
            last_transition_time: Some(Utc::now().to_rfc3339()),
            reason: reason.into(),
            message: message.into(),
        }
    }

    /// Equality over type, status, reason and message. Timestamps are ignored.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.condition_type == other.condition_type
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
    }
}

/// Outcome of [`set_condition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionChange {
    /// No condition of this type existed before
    Added,
    /// The status value flipped
    Transitioned,
    /// Same status, different reason or message
    Refreshed,
    /// Nothing but (ignored) timestamps differ
    Unchanged,
}

impl ConditionChange {
    /// True when the condition appeared or its status flipped.
    #[must_use]
    pub fn status_changed(self) -> bool {
        matches!(self, Self::Added | Self::Transitioned)
    }
}

/// Upsert `condition` into `conditions` by type.
pub fn set_condition(conditions: &mut Vec<Condition>, mut condition: Condition) -> ConditionChange {
    let Some(existing) = conditions
        .iter_mut()
        .find(|c| c.condition_type == condition.condition_type)
    else {
        conditions.push(condition);
        return ConditionChange::Added;
    };

    if existing.status != condition.status {
        *existing = condition;
        return ConditionChange::Transitioned;
    }

    condition
        .last_transition_time
        .clone_from(&existing.last_transition_time);
    let change = if existing.same_as(&condition) {
        ConditionChange::Unchanged
    } else {
        ConditionChange::Refreshed
    };
    *existing = condition;
    change
}

/// Look up a condition by type.
#[must_use]
pub fn find_condition<'a>(conditions: &'a [Condition], condition_type: &str) -> Option<&'a Condition> {
    conditions
        .iter()
        .find(|c| c.condition_type == condition_type)
}

/// Element-wise [`Condition::same_as`] over two condition lists.
#[must_use]
pub fn conditions_equivalent(left: &[Condition], right: &[Condition]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(l, r)| l.same_as(r))
}
