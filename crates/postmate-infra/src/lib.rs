//! # Postmate Infrastructure
//!
//! Concrete implementations of the ports defined in `postmate-core`.
//! This crate contains storage, outbound HTTP and authentication integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL post store via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `gateways` - WhatsApp, LinkedIn and Gemini clients via reqwest

pub mod database;
pub mod session;
pub mod store;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "gateways")]
pub mod gateways;

// Re-exports - In-Memory
pub use database::DatabaseConfig;
pub use session::InMemoryConversationSessions;
pub use store::InMemoryPostStore;

#[cfg(feature = "postgres")]
pub use database::{DatabaseConnections, PostgresPostStore};

#[cfg(feature = "auth")]
pub use auth::{Argon2CredentialVerifier, JwtConfig, JwtTokenService};

#[cfg(feature = "gateways")]
pub use gateways::{
    GeminiConfig, GeminiGenerator, LinkedInConfig, LinkedInPublisher, WhatsAppConfig,
    WhatsAppMessenger,
};
