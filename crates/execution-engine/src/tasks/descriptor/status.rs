use super::phase::SourceResolution;
use crate::crds::condition::{
    conditions_equivalent, set_condition, CONDITION_AVAILABLE, CONDITION_CREATED,
    CONDITION_FALSE, CONDITION_NOT_READY, CONDITION_TRUE,
};
use crate::crds::{Condition, DataDescriptorStatus, SourceStatus, PHASE_NOT_READY, PHASE_READY};
use crate::tasks::types::SourceError;

pub const ALL_SOURCES_HEALTHY_MESSAGE: &str = "All data sources healthy.";
pub const INITIALIZING_MESSAGE: &str = "Initializing data descriptor";

/// Status row for a source, carrying counters over from the previous pass.
#[must_use]
pub fn source_status(
    name: &str,
    previous: Option<&SourceStatus>,
    resolution: &SourceResolution,
    now: &str,
) -> SourceStatus {
    let was_ready = previous.is_some_and(|p| p.phase == PHASE_READY);
    let last_sync_time = if resolution.phase.is_ready() && !was_ready {
        Some(now.to_string())
    } else {
        previous.and_then(|p| p.last_sync_time.clone())
    };

    SourceStatus {
        name: name.to_string(),
        phase: resolution.phase.as_str().to_string(),
        last_sync_time,
        records: resolution
            .records
            .or_else(|| previous.map(|p| p.records))
            .unwrap_or_default(),
        task_id: resolution.task_id.clone(),
    }
}

/// Outcome of folding per-source phases together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    /// Sources without an error that are not yet ready
    pub not_ready: Vec<String>,
    pub errors: Vec<SourceError>,
}

impl Aggregate {
    pub fn collect<'a, I>(resolutions: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a SourceResolution)>,
    {
        let mut aggregate = Self::default();
        for (name, resolution) in resolutions {
            if let Some(error) = &resolution.error {
                aggregate.errors.push(SourceError::new(name, error.clone()));
            } else if !resolution.phase.is_ready() {
                aggregate.not_ready.push(name.to_string());
            }
        }
        aggregate
    }

    #[must_use]
    pub fn all_ready(&self) -> bool {
        self.not_ready.is_empty() && self.errors.is_empty()
    }

    #[must_use]
    pub fn overall_phase(&self) -> &'static str {
        if self.all_ready() {
            PHASE_READY
        } else {
            PHASE_NOT_READY
        }
    }

    #[must_use]
    pub fn summary(&self) -> String {
        if self.all_ready() {
            ALL_SOURCES_HEALTHY_MESSAGE.to_string()
        } else {
            format!(
                "{} data sources task not completed, {} data sources have issues",
                self.not_ready.len(),
                self.errors.len()
            )
        }
    }
}

/// Condition whose status value flipped during [`apply_conditions`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionFlip {
    pub condition_type: String,
    pub status: String,
    pub message: String,
}

/// Upsert `Available` or `NotReady` as True and flip the other one to False if present.
pub fn apply_conditions(conditions: &mut Vec<Condition>, aggregate: &Aggregate) -> Vec<ConditionFlip> {
    let (active, inactive, reason) = if aggregate.all_ready() {
        (CONDITION_AVAILABLE, CONDITION_NOT_READY, "Available")
    } else {
        (CONDITION_NOT_READY, CONDITION_AVAILABLE, "NotReady")
    };
    let message = aggregate.summary();

    let mut flips = Vec::new();
    let mut record = |condition: Condition, conditions: &mut Vec<Condition>| {
        let flip = ConditionFlip {
            condition_type: condition.condition_type.clone(),
            status: condition.status.clone(),
            message: condition.message.clone(),
        };
        if set_condition(conditions, condition).status_changed() {
            flips.push(flip);
        }
    };

    record(
        Condition::new(active, CONDITION_TRUE, reason, message.clone()),
        conditions,
    );
    if conditions.iter().any(|c| c.condition_type == inactive) {
        record(
            Condition::new(inactive, CONDITION_FALSE, reason, message),
            conditions,
        );
    }
    flips
}

/// Mark a descriptor that has never reported a phase with `Created=True`.
pub fn mark_initializing(conditions: &mut Vec<Condition>, observed_phase: &str) -> Option<ConditionFlip> {
    if !observed_phase.is_empty() {
        return None;
    }
    let condition = Condition::new(
        CONDITION_CREATED,
        CONDITION_TRUE,
        "Initializing",
        INITIALIZING_MESSAGE,
    );
    let flip = ConditionFlip {
        condition_type: condition.condition_type.clone(),
        status: condition.status.clone(),
        message: condition.message.clone(),
    };
    set_condition(conditions, condition)
        .status_changed()
        .then_some(flip)
}

/// Equality ignoring sync and transition timestamps.
#[must_use]
pub fn status_equivalent(old: &DataDescriptorStatus, new: &DataDescriptorStatus) -> bool {
    old.overall_phase == new.overall_phase
        && conditions_equivalent(&old.conditions, &new.conditions)
        && old.source_statuses.len() == new.source_statuses.len()
        && old
            .source_statuses
            .iter()
            .zip(&new.source_statuses)
            .all(|(o, n)| o.same_as(n))
        && old.consumed_by == new.consumed_by
}
