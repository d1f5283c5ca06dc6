use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Post, PostState, PostStatus};
use crate::error::RepoError;

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The stored stage matched and the new version was written.
    Applied,
    /// The stored stage changed since it was read; nothing was written.
    Conflict,
}

/// Durable post storage.
///
/// Posts are never deleted. Every mutation after `insert` goes through
/// [`PostStore::update_if`], which compares the stored stage (status and
/// review step) with the one the caller observed before computing the
/// transition.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Persist a newly created post.
    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// All posts, newest first.
    async fn list(&self) -> Result<Vec<Post>, RepoError>;

    /// The most recently created post whose status is one of `statuses`.
    async fn find_latest_with_status(
        &self,
        statuses: &[PostStatus],
    ) -> Result<Option<Post>, RepoError>;

    /// Approved posts scheduled at or before `now`, oldest schedule first.
    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError>;

    /// Write `post` only if the stored row is still at the stage of
    /// `expected` (see [`PostState::same_stage`]). Status, review step, draft
    /// and schedule are written together.
    async fn update_if(&self, post: &Post, expected: &PostState)
    -> Result<WriteOutcome, RepoError>;
}
