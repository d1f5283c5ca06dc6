//! Application services built on the domain and ports.

mod conversation;
mod locator;
mod management;
pub mod messages;
mod publisher;
mod support;

#[cfg(test)]
pub(crate) mod testing;

pub use conversation::{ConversationService, Handled};
pub use locator::{ACTIVE_STATUSES, ActivePostLocator, LatestActivePost, SenderSessionLocator};
pub use management::PostManagement;
pub use publisher::{OrchestratorConfig, RunReport, SchedulingOrchestrator};
