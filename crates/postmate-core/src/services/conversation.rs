//! Conversational handling of inbound messages.
//!
//! Each message is classified, resolved against the active post, and
//! answered with exactly one outbound message. Failures never escape a
//! single message: they end as a notice to the sender.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::locator::ActivePostLocator;
use super::messages;
use super::support::{create_with_draft, generate_draft, transition};
use crate::domain::{Intent, Post, PostStatus, PostType, TransitionError, Trigger};
use crate::error::DomainError;
use crate::ports::{ContentGenerator, MessagingGateway, PostStore};

/// Result of handling one non-blank message.
#[derive(Debug, Clone)]
pub struct Handled {
    pub intent: Intent,
    /// Post the message acted on, if any.
    pub post_id: Option<Uuid>,
    pub reply: String,
    /// Whether the messaging gateway accepted the reply.
    pub delivered: bool,
}

struct Reply {
    post_id: Option<Uuid>,
    body: String,
}

impl Reply {
    fn about(post: &Post, body: String) -> Self {
        Self {
            post_id: Some(post.id),
            body,
        }
    }

    fn plain(body: String) -> Self {
        Self {
            post_id: None,
            body,
        }
    }
}

pub struct ConversationService {
    store: Arc<dyn PostStore>,
    locator: Arc<dyn ActivePostLocator>,
    generator: Arc<dyn ContentGenerator>,
    messenger: Arc<dyn MessagingGateway>,
}

impl ConversationService {
    pub fn new(
        store: Arc<dyn PostStore>,
        locator: Arc<dyn ActivePostLocator>,
        generator: Arc<dyn ContentGenerator>,
        messenger: Arc<dyn MessagingGateway>,
    ) -> Self {
        Self {
            store,
            locator,
            generator,
            messenger,
        }
    }

    /// Handle one inbound message from `sender`.
    ///
    /// Returns `None` for blank messages, which are dropped without a reply.
    pub async fn handle_message(&self, sender: &str, text: &str) -> Option<Handled> {
        let text = text.trim();
        if text.is_empty() {
            tracing::warn!(sender = %sender, "Empty message received; ignoring");
            return None;
        }

        let intent = Intent::classify(text);
        tracing::info!(sender = %sender, intent = ?intent, "Processing message");

        let reply = match self.dispatch(sender, &intent).await {
            Ok(reply) => reply,
            Err(err) => Reply::plain(self.notice_for(sender, &err)),
        };

        let delivered = match self.messenger.send(sender, &reply.body).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(sender = %sender, error = %err, "Failed to deliver reply");
                false
            }
        };

        Some(Handled {
            intent,
            post_id: reply.post_id,
            reply: reply.body,
            delivered,
        })
    }

    async fn dispatch(&self, sender: &str, intent: &Intent) -> Result<Reply, DomainError> {
        match intent {
            Intent::Help => Ok(Reply::plain(messages::post_type_help())),
            Intent::UnknownSchedulingToken(text) => {
                tracing::info!(sender = %sender, option = %text, "Unknown scheduling option");
                Ok(Reply::plain(messages::invalid_schedule()))
            }
            Intent::NewPostRequest { topic, post_type } => {
                self.start_post(sender, topic, *post_type).await
            }
            _ => {
                let post = self
                    .locator
                    .locate(sender)
                    .await?
                    .ok_or(DomainError::NoActivePost)?;

                match self.act_on(&post, intent).await {
                    Err(DomainError::Transition(TransitionError::NotAllowed { .. })) => Ok(
                        Reply::about(&post, messages::already_scheduled(&post.topic, post.scheduled_at())),
                    ),
                    other => other,
                }
            }
        }
    }

    async fn start_post(
        &self,
        sender: &str,
        topic: &str,
        post_type: PostType,
    ) -> Result<Reply, DomainError> {
        let post = Post::new(topic, post_type)?;
        let (post, generation_error) =
            create_with_draft(self.store.as_ref(), self.generator.as_ref(), post).await?;

        if let Err(err) = self.locator.bind(sender, post.id).await {
            tracing::warn!(sender = %sender, post_id = %post.id, error = %err, "Failed to bind conversation");
        }

        match (generation_error, post.draft.as_deref()) {
            (None, Some(draft)) => {
                tracing::info!(post_id = %post.id, sender = %sender, "Draft sent for review");
                Ok(Reply::about(&post, messages::draft_menu(&post.topic, draft, post.post_type)))
            }
            _ => Ok(Reply::about(&post, messages::generation_failed(&post.topic))),
        }
    }

    async fn act_on(&self, post: &Post, intent: &Intent) -> Result<Reply, DomainError> {
        let store = self.store.as_ref();
        let now = Utc::now();

        match intent {
            Intent::ConfirmationDigit(1) => {
                transition(store, post, Trigger::RequestSchedule, now).await?;
                Ok(Reply::about(post, messages::scheduling_menu(&post.topic)))
            }
            Intent::ConfirmationDigit(0) => {
                transition(store, post, Trigger::Reject, now).await?;
                tracing::info!(post_id = %post.id, "Post rejected");
                Ok(Reply::about(post, messages::rejected(&post.topic)))
            }
            Intent::ConfirmationDigit(2) => self.regenerate(post).await,
            Intent::ConfirmationDigit(3) => {
                transition(store, post, Trigger::RequestEdit, now).await?;
                Ok(Reply::about(post, messages::edit_instructions()))
            }
            Intent::SchedulingToken(token) => {
                let next = transition(store, post, Trigger::Schedule(*token), now).await?;
                let scheduled_at = scheduled_time(&next)?;
                tracing::info!(post_id = %post.id, scheduled_at = %scheduled_at, "Post scheduled");
                Ok(Reply::about(post, messages::scheduled(&post.topic, scheduled_at)))
            }
            Intent::ModifiedDraftSubmission(text) => {
                let next = transition(store, post, Trigger::SubmitEdit(text.clone()), now).await?;
                let scheduled_at = scheduled_time(&next)?;
                tracing::info!(post_id = %post.id, scheduled_at = %scheduled_at, "Edited post scheduled");
                Ok(Reply::about(post, messages::scheduled(&post.topic, scheduled_at)))
            }
            other => Err(DomainError::Internal(format!(
                "intent {:?} does not act on a post",
                other
            ))),
        }
    }

    async fn regenerate(&self, post: &Post) -> Result<Reply, DomainError> {
        if post.status() != PostStatus::Pending {
            return Err(TransitionError::NotAllowed {
                status: post.status(),
                trigger: Trigger::Regenerated(String::new()).name(),
            }
            .into());
        }

        match generate_draft(self.generator.as_ref(), post).await {
            Ok(text) => {
                let next =
                    transition(self.store.as_ref(), post, Trigger::Regenerated(text), Utc::now())
                        .await?;
                let draft = next.draft.as_deref().unwrap_or_default();
                tracing::info!(post_id = %post.id, "Draft regenerated");
                Ok(Reply::about(post, messages::draft_menu(&next.topic, draft, next.post_type)))
            }
            Err(err) => {
                tracing::warn!(post_id = %post.id, error = %err, "Draft regeneration failed");
                Ok(Reply::about(post, messages::regeneration_failed()))
            }
        }
    }

    fn notice_for(&self, sender: &str, err: &DomainError) -> String {
        match err {
            DomainError::NoActivePost => {
                tracing::warn!(sender = %sender, "No active post for reply");
                messages::no_active_post()
            }
            DomainError::Validation(reason) => messages::invalid_topic(reason),
            DomainError::Transition(TransitionError::ScheduleNotRequested) => {
                messages::schedule_not_requested()
            }
            DomainError::Transition(TransitionError::EmptyDraft) => messages::empty_edit(),
            DomainError::Conflict(_) => messages::post_changed(),
            other => {
                tracing::error!(sender = %sender, error = %other, "Failed to handle message");
                messages::internal_failure()
            }
        }
    }
}

fn scheduled_time(post: &Post) -> Result<chrono::DateTime<Utc>, DomainError> {
    post.scheduled_at()
        .ok_or_else(|| DomainError::Internal(format!("post {} approved without a time", post.id)))
}
