//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::TransitionError;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No active post for this conversation")]
    NoActivePost,

    #[error("Transition rejected: {0}")]
    Transition(#[from] TransitionError),

    #[error("Post was modified concurrently: {0}")]
    Conflict(String),

    #[error("External service failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Repository failure: {0}")]
    Repository(#[from] RepoError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Stored row is inconsistent: {0}")]
    Corrupt(String),
}

/// Failures of the outbound transports and the content generator.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Remote rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}
