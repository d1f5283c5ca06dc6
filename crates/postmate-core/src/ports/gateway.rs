//! Outbound transports and draft generation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::PostType;
use crate::error::GatewayError;

/// Delivers plain text to a conversation endpoint (a phone number for
/// WhatsApp).
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<(), GatewayError>;
}

/// Publishes a post's text to the target platform.
#[async_trait]
pub trait PublishingGateway: Send + Sync {
    async fn publish(&self, post_id: Uuid, text: &str) -> Result<(), GatewayError>;
}

/// Produces draft text for a topic.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, topic: &str, post_type: PostType) -> Result<String, GatewayError>;
}
