//! Operator-facing post operations behind the management API.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::support::{create_with_draft, generate_draft, transition};
use crate::domain::{Post, PostType, Trigger};
use crate::error::DomainError;
use crate::ports::{ContentGenerator, PostStore};

pub struct PostManagement {
    store: Arc<dyn PostStore>,
    generator: Arc<dyn ContentGenerator>,
}

impl PostManagement {
    pub fn new(store: Arc<dyn PostStore>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self { store, generator }
    }

    /// All posts, newest first.
    pub async fn list(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, DomainError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "Post",
                id,
            })
    }

    /// Create a post and generate its first draft.
    ///
    /// A generation failure is logged and the post is returned as a Draft.
    pub async fn create(&self, topic: &str, post_type: PostType) -> Result<Post, DomainError> {
        let post = Post::new(topic, post_type)?;
        let (post, _) =
            create_with_draft(self.store.as_ref(), self.generator.as_ref(), post).await?;
        Ok(post)
    }

    /// Approve a Pending post for the default publish time.
    pub async fn approve(&self, id: Uuid) -> Result<Post, DomainError> {
        let post = self.get(id).await?;
        let next = transition(self.store.as_ref(), &post, Trigger::Approve, Utc::now()).await?;
        tracing::info!(post_id = %id, scheduled_at = ?next.scheduled_at(), "Post approved");
        Ok(next)
    }

    pub async fn reject(&self, id: Uuid) -> Result<Post, DomainError> {
        let post = self.get(id).await?;
        let next = transition(self.store.as_ref(), &post, Trigger::Reject, Utc::now()).await?;
        tracing::info!(post_id = %id, "Post rejected");
        Ok(next)
    }

    /// Replace the draft of a Pending post. Status is unchanged.
    pub async fn regenerate(&self, id: Uuid) -> Result<Post, DomainError> {
        let post = self.get(id).await?;
        // Check the transition before calling the generator.
        post.apply(Trigger::Regenerated("-".into()), Utc::now())?;

        let text = generate_draft(self.generator.as_ref(), &post).await?;
        let next =
            transition(self.store.as_ref(), &post, Trigger::Regenerated(text), Utc::now()).await?;
        tracing::info!(post_id = %id, "Draft regenerated");
        Ok(next)
    }
}
