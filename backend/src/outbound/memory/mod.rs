//! Process-local collaborators.
//!
//! These adapters keep state in memory for the lifetime of the process. They
//! back the default deployment and the HTTP integration tests.

mod analytics;
mod invitation_store;
mod user_store;

pub use analytics::{InMemoryAnalytics, UsageEvent};
pub use invitation_store::{CodeGenerator, InMemoryInvitationStore, random_code};
pub use user_store::{InMemoryUserStore, UserSeedError};
