//! In-memory collaborators for unit tests

use super::cluster::ClusterResources;
use super::events::{EventEmitter, ResourceEvent};
use crate::crds::DataDescriptor;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, ObjectReference, Service};
use kube::core::ErrorResponse;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

type Key = (String, String);

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

pub fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: format!("injected {reason}"),
        reason: reason.to_string(),
        code,
    })
}

#[derive(Default)]
pub struct FakeState {
    pub config_maps: BTreeMap<Key, ConfigMap>,
    pub services: BTreeMap<Key, Service>,
    pub deployments: BTreeMap<Key, Deployment>,
    pub descriptors: BTreeMap<Key, DataDescriptor>,
    /// `(namespace, name, patch)` for every descriptor status write
    pub descriptor_status_patches: Vec<(String, String, Value)>,
    pub agent_status_patches: Vec<(String, String, Value)>,
    /// `Kind/name` of every created child, in creation order
    pub created: Vec<String>,
    pub fail_status_patch: bool,
    /// `Kind/name` entries whose create answers 409 as if created concurrently
    pub create_conflicts: Vec<String>,
}

impl FakeState {
    fn conflict(&self, kind: &str, name: &str) -> Result<(), kube::Error> {
        if self.create_conflicts.iter().any(|c| *c == format!("{kind}/{name}")) {
            return Err(api_error(409, "AlreadyExists"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<FakeState>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn with_config_map(self, namespace: &str, name: &str, data: &[(&str, &str)]) -> Self {
        let config_map = ConfigMap {
            metadata: kube::api::ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            data: Some(
                data.iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            ),
            ..Default::default()
        };
        self.state().config_maps.insert(key(namespace, name), config_map);
        self
    }

    pub fn with_descriptor(self, descriptor: DataDescriptor) -> Self {
        let namespace = descriptor.metadata.namespace.clone().unwrap_or_default();
        let name = descriptor.metadata.name.clone().unwrap_or_default();
        self.state().descriptors.insert(key(&namespace, &name), descriptor);
        self
    }
}

#[async_trait]
impl ClusterResources for FakeCluster {
    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigMap>, kube::Error> {
        Ok(self.state().config_maps.get(&key(namespace, name)).cloned())
    }

    async fn create_config_map(
        &self,
        namespace: &str,
        config_map: &ConfigMap,
    ) -> Result<(), kube::Error> {
        let name = config_map.metadata.name.clone().unwrap_or_default();
        let mut state = self.state();
        state.conflict("ConfigMap", &name)?;
        state.created.push(format!("ConfigMap/{name}"));
        state.config_maps.insert(key(namespace, &name), config_map.clone());
        Ok(())
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Option<Service>, kube::Error> {
        Ok(self.state().services.get(&key(namespace, name)).cloned())
    }

    async fn create_service(&self, namespace: &str, service: &Service) -> Result<(), kube::Error> {
        let name = service.metadata.name.clone().unwrap_or_default();
        let mut state = self.state();
        state.conflict("Service", &name)?;
        state.created.push(format!("Service/{name}"));
        state.services.insert(key(namespace, &name), service.clone());
        Ok(())
    }

    async fn get_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Deployment>, kube::Error> {
        Ok(self.state().deployments.get(&key(namespace, name)).cloned())
    }

    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<(), kube::Error> {
        let name = deployment.metadata.name.clone().unwrap_or_default();
        let mut state = self.state();
        state.conflict("Deployment", &name)?;
        state.created.push(format!("Deployment/{name}"));
        state.deployments.insert(key(namespace, &name), deployment.clone());
        Ok(())
    }

    async fn get_data_descriptor(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<DataDescriptor>, kube::Error> {
        Ok(self.state().descriptors.get(&key(namespace, name)).cloned())
    }

    async fn patch_descriptor_status(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<(), kube::Error> {
        let mut state = self.state();
        if state.fail_status_patch {
            return Err(api_error(500, "InternalError"));
        }
        state
            .descriptor_status_patches
            .push((namespace.to_string(), name.to_string(), patch.clone()));
        Ok(())
    }

    async fn patch_agent_container_status(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<(), kube::Error> {
        let mut state = self.state();
        if state.fail_status_patch {
            return Err(api_error(500, "InternalError"));
        }
        state
            .agent_status_patches
            .push((namespace.to_string(), name.to_string(), patch.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingEmitter {
    events: Mutex<Vec<ResourceEvent>>,
}

impl RecordingEmitter {
    pub fn events(&self) -> Vec<ResourceEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn reasons(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.reason).collect()
    }
}

#[async_trait]
impl EventEmitter for RecordingEmitter {
    async fn emit(&self, _target: &ObjectReference, event: ResourceEvent) {
        self.events.lock().unwrap().push(event);
    }
}
