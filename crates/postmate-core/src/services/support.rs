//! Steps shared by the conversation, management and publishing services.

use chrono::{DateTime, Utc};

use crate::domain::{Post, PostState, Trigger};
use crate::error::{DomainError, GatewayError};
use crate::ports::{ContentGenerator, PostStore, WriteOutcome};

/// Apply `trigger` to `post` and persist the result, conditional on the
/// stage `post` was read with.
pub(crate) async fn transition(
    store: &dyn PostStore,
    post: &Post,
    trigger: Trigger,
    now: DateTime<Utc>,
) -> Result<Post, DomainError> {
    let trigger_name = trigger.name();
    let next = post.apply(trigger, now)?;
    commit(store, &next, &post.state).await?;

    tracing::debug!(
        post_id = %post.id,
        trigger = trigger_name,
        from = %post.status(),
        to = %next.status(),
        "Post transitioned"
    );
    Ok(next)
}

/// Conditionally write `next`; a changed stage abandons the write.
pub(crate) async fn commit(
    store: &dyn PostStore,
    next: &Post,
    expected: &PostState,
) -> Result<(), DomainError> {
    match store.update_if(next, expected).await? {
        WriteOutcome::Applied => Ok(()),
        WriteOutcome::Conflict => {
            tracing::warn!(
                post_id = %next.id,
                expected = ?expected,
                "Post changed since it was read; transition abandoned"
            );
            Err(DomainError::Conflict(format!(
                "post {} is no longer {:?}",
                next.id, expected
            )))
        }
    }
}

/// Ask the generator for a draft, treating blank output as a failure.
pub(crate) async fn generate_draft(
    generator: &dyn ContentGenerator,
    post: &Post,
) -> Result<String, GatewayError> {
    let text = generator.generate(&post.topic, post.post_type).await?;
    if text.trim().is_empty() {
        return Err(GatewayError::InvalidResponse(
            "generator returned an empty draft".to_string(),
        ));
    }
    Ok(text)
}

/// Insert a new post and try to generate its first draft.
///
/// Generation failure is not an error: the post stays a Draft and the
/// failure is returned next to it so the caller can tell the user.
pub(crate) async fn create_with_draft(
    store: &dyn PostStore,
    generator: &dyn ContentGenerator,
    post: Post,
) -> Result<(Post, Option<GatewayError>), DomainError> {
    let post = store.insert(post).await?;
    tracing::info!(
        post_id = %post.id,
        topic = %post.topic,
        post_type = %post.post_type,
        "Post created"
    );

    match generate_draft(generator, &post).await {
        Ok(text) => {
            let next = transition(store, &post, Trigger::DraftGenerated(text), Utc::now()).await?;
            Ok((next, None))
        }
        Err(err) => {
            tracing::warn!(post_id = %post.id, error = %err, "Draft generation failed");
            Ok((post, Some(err)))
        }
    }
}
