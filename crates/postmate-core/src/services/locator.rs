//! Resolution of the post a conversational reply refers to.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostStatus};
use crate::error::RepoError;
use crate::ports::{ConversationSessions, PostStore};

/// Statuses a reply can still act on.
pub const ACTIVE_STATUSES: [PostStatus; 2] = [PostStatus::Pending, PostStatus::Approved];

/// Finds the active post for a sender's reply.
#[async_trait]
pub trait ActivePostLocator: Send + Sync {
    async fn locate(&self, sender: &str) -> Result<Option<Post>, RepoError>;

    /// Called when `sender` creates `post_id` through the conversation.
    async fn bind(&self, _sender: &str, _post_id: Uuid) -> Result<(), RepoError> {
        Ok(())
    }
}

/// The most recently created Pending or Approved post, whoever created it.
///
/// Every sender shares the same "current post": two people replying at the
/// same time act on each other's post. Use [`SenderSessionLocator`] when
/// more than one person talks to the bot.
pub struct LatestActivePost {
    store: Arc<dyn PostStore>,
}

impl LatestActivePost {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ActivePostLocator for LatestActivePost {
    async fn locate(&self, _sender: &str) -> Result<Option<Post>, RepoError> {
        self.store.find_latest_with_status(&ACTIVE_STATUSES).await
    }
}

/// The post the sender last created, as long as it is still active.
pub struct SenderSessionLocator {
    store: Arc<dyn PostStore>,
    sessions: Arc<dyn ConversationSessions>,
}

impl SenderSessionLocator {
    pub fn new(store: Arc<dyn PostStore>, sessions: Arc<dyn ConversationSessions>) -> Self {
        Self { store, sessions }
    }
}

#[async_trait]
impl ActivePostLocator for SenderSessionLocator {
    async fn locate(&self, sender: &str) -> Result<Option<Post>, RepoError> {
        let Some(post_id) = self.sessions.active(sender).await? else {
            return Ok(None);
        };

        let post = self.store.find_by_id(post_id).await?;
        match post {
            Some(post) if ACTIVE_STATUSES.contains(&post.status()) => Ok(Some(post)),
            _ => {
                tracing::debug!(sender = %sender, post_id = %post_id, "Session post no longer active");
                self.sessions.clear(sender).await?;
                Ok(None)
            }
        }
    }

    async fn bind(&self, sender: &str, post_id: Uuid) -> Result<(), RepoError> {
        self.sessions.bind(sender, post_id).await
    }
}
