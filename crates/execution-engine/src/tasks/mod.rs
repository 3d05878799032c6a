use crate::crds::{DataAgentContainer, DataDescriptor};
use futures::StreamExt;
use k8s_openapi::api::{apps::v1::Deployment, core::v1::Service};
use k8s_openapi::NamespaceResourceScope;
use kube::runtime::controller::{Action, Controller};
use kube::runtime::watcher::Config;
use kube::{Api, Client, Resource, ResourceExt};
use std::fmt::Debug;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn, Instrument};

pub mod agent;
pub mod cluster;
pub mod config;
pub mod descriptor;
pub mod events;
pub mod task_queue;
pub mod types;

#[cfg(test)]
mod testing;

pub use agent::reconcile_agent_container;
pub use config::ControllerConfig;
pub use descriptor::reconcile_data_descriptor;
pub use types::{Error, Result};

use cluster::KubeClusterResources;
use config::ReconcileConfig;
use events::KubeEventEmitter;
use task_queue::HttpTaskQueue;
use types::Context;

const CONTROLLER_NAME: &str = "dac-execution-engine";

/// Run the `DataAgentContainer` and `DataDescriptor` controllers until `shutdown` fires.
#[instrument(skip_all, fields(namespace = config.watch_namespace.as_deref().unwrap_or("*")))]
pub async fn run_task_controller(
    client: Client,
    config: ControllerConfig,
    shutdown: CancellationToken,
) -> Result<()> {
    info!(
        task_queue = %config.task_queue.base_url,
        "Starting DAC controllers"
    );

    let task_queue = HttpTaskQueue::new(&config.task_queue.base_url, config.task_queue.timeout())?;
    let context = Arc::new(Context {
        client: client.clone(),
        cluster: Arc::new(KubeClusterResources::new(client.clone())),
        task_queue: Arc::new(task_queue),
        events: Arc::new(KubeEventEmitter::new(client.clone(), CONTROLLER_NAME)),
        config: Arc::new(config),
        shutdown,
    });

    let agent_handle = tokio::spawn(run_agent_controller(context.clone()));
    let descriptor_handle = tokio::spawn(run_descriptor_controller(context.clone()));

    match tokio::try_join!(agent_handle, descriptor_handle) {
        Ok((agent_result, descriptor_result)) => {
            if let Err(e) = agent_result {
                error!("DataAgentContainer controller failed: {:?}", e);
            }
            if let Err(e) = descriptor_result {
                error!("DataDescriptor controller failed: {:?}", e);
            }
        }
        Err(e) => {
            error!("Controller task join error: {:?}", e);
        }
    }

    info!("Task controllers shutting down");
    Ok(())
}

fn scoped_api<K>(client: &Client, namespace: Option<&str>) -> Api<K>
where
    K: Resource<Scope = NamespaceResourceScope>,
    <K as Resource>::DynamicType: Default,
{
    match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    }
}

fn shutdown_future(ctx: &Context) -> impl std::future::Future<Output = ()> + Send + Sync + 'static {
    let token = ctx.shutdown.clone();
    async move { token.cancelled().await }
}

async fn run_agent_controller(context: Arc<Context>) -> Result<()> {
    info!("Starting DataAgentContainer controller");

    let namespace = context.config.watch_namespace.as_deref();
    let agents: Api<DataAgentContainer> = scoped_api(&context.client, namespace);
    let deployments: Api<Deployment> = scoped_api(&context.client, namespace);
    let services: Api<Service> = scoped_api(&context.client, namespace);
    let watcher_config = Config::default().any_semantic();

    Controller::new(agents, watcher_config.clone())
        .owns(deployments, watcher_config.clone())
        .owns(services, watcher_config)
        .graceful_shutdown_on(shutdown_future(&context))
        .run(reconcile_agent_container, error_policy, context.clone())
        .for_each(|result| {
            let span = tracing::info_span!("agent_reconciliation_result");
            async move { log_result("DataAgentContainer", result) }.instrument(span)
        })
        .await;

    info!("DataAgentContainer controller shutting down");
    Ok(())
}

async fn run_descriptor_controller(context: Arc<Context>) -> Result<()> {
    info!("Starting DataDescriptor controller");

    let namespace = context.config.watch_namespace.as_deref();
    let descriptors: Api<DataDescriptor> = scoped_api(&context.client, namespace);

    Controller::new(descriptors, Config::default().any_semantic())
        .graceful_shutdown_on(shutdown_future(&context))
        .run(reconcile_data_descriptor, error_policy, context.clone())
        .for_each(|result| {
            let span = tracing::info_span!("descriptor_reconciliation_result");
            async move { log_result("DataDescriptor", result) }.instrument(span)
        })
        .await;

    info!("DataDescriptor controller shutting down");
    Ok(())
}

fn log_result<T: Debug, E: Debug>(kind: &str, result: std::result::Result<T, E>) {
    match result {
        Ok(resource) => info!(resource = ?resource, "{kind} reconciliation successful"),
        Err(e) => error!(error = ?e, "{kind} reconciliation error"),
    }
}

/// Shared by both controllers: log and requeue after the configured backoff.
fn error_policy<K>(resource: Arc<K>, err: &Error, ctx: Arc<Context>) -> Action
where
    K: Resource,
{
    if matches!(err, Error::Cancelled) {
        info!(name = %resource.name_any(), "Reconciliation cancelled by shutdown");
    } else {
        warn!(
            error = %err,
            name = %resource.name_any(),
            namespace = %resource.namespace().unwrap_or_default(),
            "Reconciliation failed, requeueing"
        );
    }
    error_action(err, &ctx.config.reconcile)
}

/// Cancellation only happens on shutdown, so it is not retried.
fn error_action(err: &Error, reconcile: &ReconcileConfig) -> Action {
    match err {
        Error::Cancelled => Action::await_change(),
        _ => Action::requeue(reconcile.error_requeue()),
    }
}
