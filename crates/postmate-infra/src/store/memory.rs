//! In-memory post store - used when `DATABASE_URL` is not set.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use postmate_core::domain::{Post, PostState, PostStatus};
use postmate_core::error::RepoError;
use postmate_core::ports::{PostStore, WriteOutcome};

/// Posts kept in a HashMap behind an async RwLock.
///
/// The stage check and write in `update_if` happen under one write lock.
/// Note: Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryPostStore {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.id) {
            return Err(RepoError::Constraint(format!("post {} already exists", post.id)));
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let mut posts: Vec<Post> = self.posts.read().await.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn find_latest_with_status(
        &self,
        statuses: &[PostStatus],
    ) -> Result<Option<Post>, RepoError> {
        Ok(self
            .posts
            .read()
            .await
            .values()
            .filter(|p| statuses.contains(&p.status()))
            .max_by_key(|p| p.created_at)
            .cloned())
    }

    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let mut due: Vec<Post> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|p| p.scheduled_at());
        Ok(due)
    }

    async fn update_if(
        &self,
        post: &Post,
        expected: &PostState,
    ) -> Result<WriteOutcome, RepoError> {
        let mut posts = self.posts.write().await;
        let Some(stored) = posts.get_mut(&post.id) else {
            return Err(RepoError::NotFound);
        };
        if !stored.state.same_stage(expected) {
            return Ok(WriteOutcome::Conflict);
        }
        *stored = post.clone();
        Ok(WriteOutcome::Applied)
    }
}
