use super::coordinator::SourceSyncCoordinator;
use crate::crds::DataDescriptor;
use crate::tasks::config::ReconcileConfig;
use crate::tasks::types::{Context, Error, Result, DESCRIPTOR_FINALIZER_NAME};
use kube::runtime::controller::Action;
use kube::runtime::finalizer::{finalizer, Event as FinalizerEvent};
use kube::{Api, ResourceExt};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[instrument(skip(descriptor, ctx), fields(name = %descriptor.name_any(), namespace = %descriptor.namespace().unwrap_or_default()))]
pub async fn reconcile_data_descriptor(
    descriptor: Arc<DataDescriptor>,
    ctx: Arc<Context>,
) -> Result<Action> {
    info!("Starting reconcile for DataDescriptor: {}", descriptor.name_any());

    let namespace = descriptor.namespace().unwrap_or_default();
    let descriptors: Api<DataDescriptor> = Api::namespaced(ctx.client.clone(), &namespace);

    let result = finalizer(
        &descriptors,
        DESCRIPTOR_FINALIZER_NAME,
        descriptor,
        |event| async {
            match event {
                FinalizerEvent::Apply(dd) => sync_sources(dd, &ctx).await,
                FinalizerEvent::Cleanup(dd) => cleanup_descriptor(dd, &ctx).await,
            }
        },
    )
    .await
    .map_err(|e| match e {
        kube::runtime::finalizer::Error::ApplyFailed(err)
        | kube::runtime::finalizer::Error::CleanupFailed(err) => err,
        kube::runtime::finalizer::Error::AddFinalizer(e)
        | kube::runtime::finalizer::Error::RemoveFinalizer(e) => Error::KubeError(e),
        kube::runtime::finalizer::Error::UnnamedObject => Error::MissingObjectKey,
        kube::runtime::finalizer::Error::InvalidFinalizer => {
            Error::ConfigError("Invalid finalizer name".to_string())
        }
    })?;

    debug!("Reconcile completed with result: {:?}", result);
    Ok(result)
}

async fn sync_sources(descriptor: Arc<DataDescriptor>, ctx: &Context) -> Result<Action> {
    let cancel = ctx.shutdown.child_token();
    let outcome = SourceSyncCoordinator {
        cluster: ctx.cluster.as_ref(),
        task_queue: ctx.task_queue.as_ref(),
        events: ctx.events.as_ref(),
        cancel: &cancel,
    }
    .reconcile(&descriptor)
    .await?
    .into_result()?;

    Ok(requeue_for(outcome.is_ready(), &ctx.config.reconcile))
}

/// Ready descriptors wait for a spec change; pending ones are polled again.
fn requeue_for(ready: bool, reconcile: &ReconcileConfig) -> Action {
    if ready {
        Action::await_change()
    } else {
        Action::requeue(reconcile.poll_interval())
    }
}

async fn cleanup_descriptor(descriptor: Arc<DataDescriptor>, ctx: &Context) -> Result<Action> {
    info!("Cleaning up DataDescriptor: {}", descriptor.name_any());
    let cancel = ctx.shutdown.child_token();
    let task_id = SourceSyncCoordinator {
        cluster: ctx.cluster.as_ref(),
        task_queue: ctx.task_queue.as_ref(),
        events: ctx.events.as_ref(),
        cancel: &cancel,
    }
    .delete(&descriptor)
    .await?;

    debug!(task_id = %task_id, "Delete task submitted, releasing finalizer");
    Ok(Action::await_change())
}
