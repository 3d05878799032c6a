pub mod agent_container;
pub mod condition;
pub mod data_descriptor;

pub use agent_container::*;
pub use condition::{Condition, ConditionChange};
pub use data_descriptor::*;
