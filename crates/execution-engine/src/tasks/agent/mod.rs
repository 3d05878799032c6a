pub mod controller;
pub mod generator;
pub mod naming;
pub mod resources;

pub use controller::reconcile_agent_container;
pub use generator::{DesiredStateGenerator, ProvisionOutcome};
