//! Typed cluster access used by the reconciliation core

use crate::crds::{DataAgentContainer, DataDescriptor};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use kube::api::{Patch, PatchParams, PostParams};
use kube::{Api, Client};
use serde_json::Value;

type KubeResult<T> = std::result::Result<T, kube::Error>;

#[async_trait]
pub trait ClusterResources: Send + Sync {
    async fn get_config_map(&self, namespace: &str, name: &str) -> KubeResult<Option<ConfigMap>>;
    async fn create_config_map(&self, namespace: &str, config_map: &ConfigMap) -> KubeResult<()>;

    async fn get_service(&self, namespace: &str, name: &str) -> KubeResult<Option<Service>>;
    async fn create_service(&self, namespace: &str, service: &Service) -> KubeResult<()>;

    async fn get_deployment(&self, namespace: &str, name: &str) -> KubeResult<Option<Deployment>>;
    async fn create_deployment(&self, namespace: &str, deployment: &Deployment) -> KubeResult<()>;

    async fn get_data_descriptor(
        &self,
        namespace: &str,
        name: &str,
    ) -> KubeResult<Option<DataDescriptor>>;

    /// Merge-patch the status sub-resource of a `DataDescriptor`.
    async fn patch_descriptor_status(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> KubeResult<()>;

    /// Merge-patch the status sub-resource of a `DataAgentContainer`.
    async fn patch_agent_container_status(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> KubeResult<()>;
}

/// [`ClusterResources`] backed by the API server
#[derive(Clone)]
pub struct KubeClusterResources {
    client: Client,
}

impl KubeClusterResources {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ClusterResources for KubeClusterResources {
    async fn get_config_map(&self, namespace: &str, name: &str) -> KubeResult<Option<ConfigMap>> {
        self.api::<ConfigMap>(namespace).get_opt(name).await
    }

    async fn create_config_map(&self, namespace: &str, config_map: &ConfigMap) -> KubeResult<()> {
        self.api::<ConfigMap>(namespace)
            .create(&PostParams::default(), config_map)
            .await
            .map(|_| ())
    }

    async fn get_service(&self, namespace: &str, name: &str) -> KubeResult<Option<Service>> {
        self.api::<Service>(namespace).get_opt(name).await
    }

    async fn create_service(&self, namespace: &str, service: &Service) -> KubeResult<()> {
        self.api::<Service>(namespace)
            .create(&PostParams::default(), service)
            .await
            .map(|_| ())
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> KubeResult<Option<Deployment>> {
        self.api::<Deployment>(namespace).get_opt(name).await
    }

    async fn create_deployment(&self, namespace: &str, deployment: &Deployment) -> KubeResult<()> {
        self.api::<Deployment>(namespace)
            .create(&PostParams::default(), deployment)
            .await
            .map(|_| ())
    }

    async fn get_data_descriptor(
        &self,
        namespace: &str,
        name: &str,
    ) -> KubeResult<Option<DataDescriptor>> {
        self.api::<DataDescriptor>(namespace).get_opt(name).await
    }

    async fn patch_descriptor_status(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> KubeResult<()> {
        self.api::<DataDescriptor>(namespace)
            .patch_status(name, &PatchParams::default(), &Patch::Merge(patch))
            .await
            .map(|_| ())
    }

    async fn patch_agent_container_status(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> KubeResult<()> {
        self.api::<DataAgentContainer>(namespace)
            .patch_status(name, &PatchParams::default(), &Patch::Merge(patch))
            .await
            .map(|_| ())
    }
}
