use async_trait::async_trait;
use uuid::Uuid;

use crate::error::RepoError;

/// Maps a conversation sender to the post they are currently working on.
#[async_trait]
pub trait ConversationSessions: Send + Sync {
    /// Remember `post_id` as the sender's active post, replacing any previous one.
    async fn bind(&self, sender: &str, post_id: Uuid) -> Result<(), RepoError>;

    /// The sender's active post id, if one is bound and not expired.
    async fn active(&self, sender: &str) -> Result<Option<Uuid>, RepoError>;

    async fn clear(&self, sender: &str) -> Result<(), RepoError>;
}
