use crate::crds::DataAgentContainer;
use kube::ResourceExt;

pub const ORCHESTRATOR_PORT: i32 = 10100;
pub const EXPERT_PORT: i32 = 10101;

pub const ORCHESTRATOR_CONTAINER: &str = "orchestrator";
pub const EXPERT_CONTAINER: &str = "expert";

pub const SKILLS_KEY: &str = "skills.json";
pub const SKILLS_VOLUME: &str = "skills-config";
pub const SKILLS_MOUNT_PATH: &str = "/app/skills.json";

/// Child object names derived from an agent container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResourceNames {
    pub app: String,
    pub namespace: String,
    pub service: String,
    pub deployment: String,
    pub skills: String,
}

impl AgentResourceNames {
    pub fn for_container(agent: &DataAgentContainer) -> Self {
        Self::new(&agent.name_any(), &agent.namespace().unwrap_or_default())
    }

    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            app: name.to_string(),
            namespace: namespace.to_string(),
            service: format!("{name}-service"),
            deployment: format!("{name}-deployment"),
            skills: format!("{name}-skills"),
        }
    }

    /// In-cluster DNS name of the agent service
    pub fn service_host(&self) -> String {
        format!("{}.{}.svc.cluster.local", self.service, self.namespace)
    }
}
