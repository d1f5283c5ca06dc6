//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod gateway;
mod repository;
mod session;

pub use auth::{AuthError, CredentialVerifier, TokenClaims, TokenService};
pub use gateway::{ContentGenerator, MessagingGateway, PublishingGateway};
pub use repository::{PostStore, WriteOutcome};
pub use session::ConversationSessions;
