pub mod controller;
pub mod coordinator;
pub mod phase;
pub mod prompts;
pub mod status;

pub use controller::reconcile_data_descriptor;
pub use coordinator::{SourceSyncCoordinator, SyncOutcome};
