//! Post lifecycle transitions.
//!
//! ```text
//! Draft ──DraftGenerated──► Pending{Review} ◄──Regenerated── Pending{*}
//!                              │  RequestSchedule ─► Pending{AwaitingSchedule} ──Schedule──► Approved
//!                              │  RequestEdit ─────► Pending{AwaitingEdit}
//!                              │  SubmitEdit / Approve ───────────────────────────────────► Approved
//!                              └─ Reject ─► Rejected
//! Approved ──Publish──► Posted
//! ```
//!
//! [`Post::apply`] is pure: it returns the next version of the post or an
//! error, and never touches storage.

use std::fmt;

use chrono::{DateTime, Utc};

use super::post::{Post, PostState, PostStatus, ReviewStep};
use super::schedule::{SchedulingToken, default_publish_time};

/// Event that moves a post through its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    DraftGenerated(String),
    RequestSchedule,
    Schedule(SchedulingToken),
    Reject,
    Regenerated(String),
    RequestEdit,
    SubmitEdit(String),
    Approve,
    Publish,
}

impl Trigger {
    pub fn name(&self) -> &'static str {
        match self {
            Trigger::DraftGenerated(_) => "draft_generated",
            Trigger::RequestSchedule => "request_schedule",
            Trigger::Schedule(_) => "schedule",
            Trigger::Reject => "reject",
            Trigger::Regenerated(_) => "regenerated",
            Trigger::RequestEdit => "request_edit",
            Trigger::SubmitEdit(_) => "submit_edit",
            Trigger::Approve => "approve",
            Trigger::Publish => "publish",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot {trigger} a post in status {status}")]
    NotAllowed {
        status: PostStatus,
        trigger: &'static str,
    },

    #[error("a scheduling option is only accepted after approving with 1")]
    ScheduleNotRequested,

    #[error("modified draft is empty")]
    EmptyDraft,

    #[error("generated draft is empty")]
    EmptyGeneratedDraft,

    #[error("post {0} is not due for publishing")]
    NotDue(uuid::Uuid),
}

impl Post {
    /// Compute the post that results from `trigger` at time `now`.
    pub fn apply(&self, trigger: Trigger, now: DateTime<Utc>) -> Result<Post, TransitionError> {
        let mut next = self.clone();

        match (self.state, trigger) {
            (PostState::Draft, Trigger::DraftGenerated(text)) => {
                next.draft = Some(non_empty_generated(text)?);
                next.state = PostState::Pending {
                    step: ReviewStep::Review,
                };
            }
            (PostState::Pending { .. }, Trigger::RequestSchedule) => {
                next.state = PostState::Pending {
                    step: ReviewStep::AwaitingSchedule,
                };
            }
            (
                PostState::Pending {
                    step: ReviewStep::AwaitingSchedule,
                },
                Trigger::Schedule(token),
            ) => {
                next.state = PostState::Approved {
                    scheduled_at: token.publish_time(now),
                };
            }
            (PostState::Pending { .. }, Trigger::Schedule(_)) => {
                return Err(TransitionError::ScheduleNotRequested);
            }
            (PostState::Pending { .. }, Trigger::Reject) => {
                next.state = PostState::Rejected;
            }
            (PostState::Pending { .. }, Trigger::Regenerated(text)) => {
                next.draft = Some(non_empty_generated(text)?);
                next.state = PostState::Pending {
                    step: ReviewStep::Review,
                };
            }
            (PostState::Pending { .. }, Trigger::RequestEdit) => {
                next.state = PostState::Pending {
                    step: ReviewStep::AwaitingEdit,
                };
            }
            (PostState::Pending { .. }, Trigger::SubmitEdit(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(TransitionError::EmptyDraft);
                }
                next.draft = Some(text.to_string());
                next.state = PostState::Approved {
                    scheduled_at: default_publish_time(now),
                };
            }
            (PostState::Pending { .. }, Trigger::Approve) => {
                next.state = PostState::Approved {
                    scheduled_at: default_publish_time(now),
                };
            }
            (PostState::Approved { scheduled_at }, Trigger::Publish) => {
                if scheduled_at > now {
                    return Err(TransitionError::NotDue(self.id));
                }
                next.state = PostState::Posted { scheduled_at };
            }
            (state, trigger) => {
                return Err(TransitionError::NotAllowed {
                    status: state.status(),
                    trigger: trigger.name(),
                });
            }
        }

        Ok(next)
    }
}

fn non_empty_generated(text: String) -> Result<String, TransitionError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TransitionError::EmptyGeneratedDraft);
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use proptest::prelude::*;

    use super::*;
    use crate::domain::PostType;

    fn pending(now: DateTime<Utc>) -> Post {
        Post::new_at("AI in healthcare", PostType::Educational, now)
            .unwrap()
            .apply(Trigger::DraftGenerated("A draft".into()), now)
            .unwrap()
    }

    #[test]
    fn test_generated_draft_moves_to_pending() {
        let now = Utc::now();
        let post = pending(now);

        assert_eq!(post.status(), PostStatus::Pending);
        assert_eq!(post.draft.as_deref(), Some("A draft"));
        assert_eq!(post.state.review_step(), Some(ReviewStep::Review));
    }

    #[test]
    fn test_empty_generated_draft_is_rejected() {
        let now = Utc::now();
        let draft = Post::new_at("topic", PostType::Listicle, now).unwrap();

        assert_eq!(
            draft.apply(Trigger::DraftGenerated("  ".into()), now),
            Err(TransitionError::EmptyGeneratedDraft)
        );
    }

    #[test]
    fn test_schedule_requires_request_first() {
        let now = Utc::now();
        let post = pending(now);

        assert_eq!(
            post.apply(Trigger::Schedule(SchedulingToken::OneHour), now),
            Err(TransitionError::ScheduleNotRequested)
        );

        let awaiting = post.apply(Trigger::RequestSchedule, now).unwrap();
        assert_eq!(awaiting.status(), PostStatus::Pending);
        assert!(awaiting.scheduled_at().is_none());

        let approved = awaiting
            .apply(Trigger::Schedule(SchedulingToken::FourHours), now)
            .unwrap();
        assert_eq!(approved.status(), PostStatus::Approved);
        assert_eq!(approved.scheduled_at(), Some(now + TimeDelta::hours(4)));
    }

    #[test]
    fn test_reject_is_terminal() {
        let now = Utc::now();
        let rejected = pending(now).apply(Trigger::Reject, now).unwrap();

        assert_eq!(rejected.status(), PostStatus::Rejected);
        assert!(rejected.scheduled_at().is_none());

        for trigger in [
            Trigger::RequestSchedule,
            Trigger::Reject,
            Trigger::Regenerated("x".into()),
            Trigger::RequestEdit,
            Trigger::SubmitEdit("x".into()),
            Trigger::Approve,
            Trigger::Publish,
        ] {
            assert!(matches!(
                rejected.apply(trigger, now),
                Err(TransitionError::NotAllowed { .. })
            ));
        }
    }

    #[test]
    fn test_regenerate_only_replaces_draft() {
        let now = Utc::now();
        let post = pending(now).apply(Trigger::RequestEdit, now).unwrap();

        let regenerated = post.apply(Trigger::Regenerated("Second".into()), now).unwrap();
        assert_eq!(regenerated.status(), PostStatus::Pending);
        assert_eq!(regenerated.draft.as_deref(), Some("Second"));
        assert_eq!(regenerated.state.review_step(), Some(ReviewStep::Review));
        assert_eq!(regenerated.id, post.id);
        assert_eq!(regenerated.created_at, post.created_at);
    }

    #[test]
    fn test_submit_edit_approves_with_default_delay() {
        let now = Utc::now();
        let approved = pending(now)
            .apply(Trigger::SubmitEdit("Here is my edited post".into()), now)
            .unwrap();

        assert_eq!(approved.status(), PostStatus::Approved);
        assert_eq!(approved.draft.as_deref(), Some("Here is my edited post"));
        assert_eq!(approved.scheduled_at(), Some(now + TimeDelta::minutes(5)));
    }

    #[test]
    fn test_empty_edit_keeps_pending() {
        let now = Utc::now();
        let post = pending(now);

        assert_eq!(
            post.apply(Trigger::SubmitEdit("   ".into()), now),
            Err(TransitionError::EmptyDraft)
        );
    }

    #[test]
    fn test_publish_requires_due_approved_post() {
        let now = Utc::now();
        let approved = pending(now).apply(Trigger::Approve, now).unwrap();

        assert!(matches!(
            approved.apply(Trigger::Publish, now),
            Err(TransitionError::NotDue(_))
        ));

        let later = now + TimeDelta::minutes(6);
        let posted = approved.apply(Trigger::Publish, later).unwrap();
        assert_eq!(posted.status(), PostStatus::Posted);
        assert_eq!(posted.scheduled_at(), approved.scheduled_at());

        assert!(posted.apply(Trigger::Publish, later).is_err());
    }

    #[test]
    fn test_draft_cannot_be_approved_or_published() {
        let now = Utc::now();
        let draft = Post::new_at("topic", PostType::Interview, now).unwrap();

        assert!(draft.apply(Trigger::Approve, now).is_err());
        assert!(draft.apply(Trigger::Publish, now).is_err());
        assert!(draft.apply(Trigger::Reject, now).is_err());
    }

    fn any_trigger() -> impl Strategy<Value = Trigger> {
        prop_oneof![
            Just(Trigger::DraftGenerated("generated".into())),
            Just(Trigger::RequestSchedule),
            proptest::sample::select(SchedulingToken::ALL.to_vec()).prop_map(Trigger::Schedule),
            Just(Trigger::Reject),
            Just(Trigger::Regenerated("regenerated".into())),
            Just(Trigger::RequestEdit),
            prop_oneof![Just("edit"), Just("")].prop_map(|t| Trigger::SubmitEdit(t.into())),
            Just(Trigger::Approve),
            Just(Trigger::Publish),
        ]
    }

    proptest! {
        #[test]
        fn test_scheduled_at_only_on_approved_or_posted(
            steps in proptest::collection::vec((any_trigger(), 0i64..600), 1..20)
        ) {
            let mut now = Utc::now();
            let mut post = Post::new_at("topic", PostType::Storytelling, now).unwrap();

            for (trigger, minutes) in steps {
                now += TimeDelta::minutes(minutes);
                let before = post.status();
                let is_regeneration = matches!(trigger, Trigger::Regenerated(_));

                if let Ok(next) = post.apply(trigger, now) {
                    if is_regeneration {
                        prop_assert_eq!(next.status(), before);
                    }
                    post = next;
                }

                let scheduled = post.scheduled_at().is_some();
                let may_schedule =
                    matches!(post.status(), PostStatus::Approved | PostStatus::Posted);
                prop_assert_eq!(scheduled, may_schedule);
            }
        }
    }
}
