use super::generator::DesiredStateGenerator;
use crate::crds::DataAgentContainer;
use crate::tasks::events::{ResourceEvent, REASON_CREATED, REASON_UPDATED};
use crate::tasks::types::{Context, Result};
use kube::runtime::controller::Action;
use kube::{Resource, ResourceExt};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[instrument(skip(agent, ctx), fields(name = %agent.name_any(), namespace = %agent.namespace().unwrap_or_default()))]
pub async fn reconcile_agent_container(
    agent: Arc<DataAgentContainer>,
    ctx: Arc<Context>,
) -> Result<Action> {
    info!("Starting reconcile for DataAgentContainer: {}", agent.name_any());

    if agent.metadata.deletion_timestamp.is_some() {
        debug!("DataAgentContainer is being deleted, children are garbage collected");
        return Ok(Action::await_change());
    }

    let cancel = ctx.shutdown.child_token();
    let outcome = DesiredStateGenerator {
        cluster: ctx.cluster.as_ref(),
        platform: &ctx.config.platform,
        cancel: &cancel,
    }
    .reconcile(&agent)
    .await?;

    let target = agent.object_ref(&());
    for child in &outcome.created {
        ctx.events
            .emit(&target, ResourceEvent::normal(REASON_CREATED, format!("Created {child}")))
            .await;
    }
    if outcome.status_written {
        ctx.events
            .emit(
                &target,
                ResourceEvent::normal(
                    REASON_UPDATED,
                    format!("Published endpoint for {}", agent.name_any()),
                ),
            )
            .await;
    }

    debug!(
        created = ?outcome.created,
        status_written = outcome.status_written,
        "DataAgentContainer provisioned"
    );
    Ok(Action::await_change())
}
