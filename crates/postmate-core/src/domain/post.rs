use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Longest topic accepted, in characters.
pub const MAX_TOPIC_LEN: usize = 500;

/// Content style requested for a generated draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostType {
    #[default]
    Educational,
    Listicle,
    Storytelling,
    ThoughtLeadership,
    Interview,
    Difference,
}

impl PostType {
    pub const ALL: [PostType; 6] = [
        PostType::Educational,
        PostType::Listicle,
        PostType::Storytelling,
        PostType::ThoughtLeadership,
        PostType::Interview,
        PostType::Difference,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Educational => "educational",
            PostType::Listicle => "listicle",
            PostType::Storytelling => "storytelling",
            PostType::ThoughtLeadership => "thought-leadership",
            PostType::Interview => "interview",
            PostType::Difference => "difference",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        PostType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::Validation(format!("unknown post type '{}'", s)))
    }
}

/// Flat status projection, used for store queries and API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
    Posted,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "Draft",
            PostStatus::Pending => "Pending",
            PostStatus::Approved => "Approved",
            PostStatus::Rejected => "Rejected",
            PostStatus::Posted => "Posted",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(PostStatus::Draft),
            "Pending" => Ok(PostStatus::Pending),
            "Approved" => Ok(PostStatus::Approved),
            "Rejected" => Ok(PostStatus::Rejected),
            "Posted" => Ok(PostStatus::Posted),
            other => Err(DomainError::Validation(format!("unknown status '{}'", other))),
        }
    }
}

/// Where a pending post is in the review conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReviewStep {
    /// Draft and menu were sent; waiting for a digit.
    #[default]
    Review,
    /// Scheduling menu was sent; waiting for a scheduling token.
    AwaitingSchedule,
    /// Edit instructions were sent; waiting for `3 <text>`.
    AwaitingEdit,
}

impl ReviewStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStep::Review => "Review",
            ReviewStep::AwaitingSchedule => "AwaitingSchedule",
            ReviewStep::AwaitingEdit => "AwaitingEdit",
        }
    }
}

impl FromStr for ReviewStep {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Review" => Ok(ReviewStep::Review),
            "AwaitingSchedule" => Ok(ReviewStep::AwaitingSchedule),
            "AwaitingEdit" => Ok(ReviewStep::AwaitingEdit),
            other => Err(DomainError::Validation(format!(
                "unknown review step '{}'",
                other
            ))),
        }
    }
}

/// Lifecycle state of a post.
///
/// The publish time only exists on the variants that can carry one, so a
/// post can never be scheduled while it is a draft, pending or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum PostState {
    Draft,
    Pending { step: ReviewStep },
    Approved { scheduled_at: DateTime<Utc> },
    Rejected,
    Posted { scheduled_at: DateTime<Utc> },
}

impl PostState {
    pub fn status(&self) -> PostStatus {
        match self {
            PostState::Draft => PostStatus::Draft,
            PostState::Pending { .. } => PostStatus::Pending,
            PostState::Approved { .. } => PostStatus::Approved,
            PostState::Rejected => PostStatus::Rejected,
            PostState::Posted { .. } => PostStatus::Posted,
        }
    }

    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        match self {
            PostState::Approved { scheduled_at } | PostState::Posted { scheduled_at } => {
                Some(*scheduled_at)
            }
            _ => None,
        }
    }

    pub fn review_step(&self) -> Option<ReviewStep> {
        match self {
            PostState::Pending { step } => Some(*step),
            _ => None,
        }
    }

    /// Same status and, while Pending, the same review step. This is what a
    /// conditional write compares.
    pub fn same_stage(&self, other: &PostState) -> bool {
        self.status() == other.status() && self.review_step() == other.review_step()
    }

    /// Rebuild a state from its stored columns, rejecting combinations the
    /// lifecycle can never produce.
    pub fn from_parts(
        status: PostStatus,
        step: Option<ReviewStep>,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> Result<Self, DomainError> {
        match (status, scheduled_at) {
            (PostStatus::Draft, None) => Ok(PostState::Draft),
            (PostStatus::Pending, None) => Ok(PostState::Pending {
                step: step.unwrap_or_default(),
            }),
            (PostStatus::Approved, Some(scheduled_at)) => Ok(PostState::Approved { scheduled_at }),
            (PostStatus::Rejected, None) => Ok(PostState::Rejected),
            (PostStatus::Posted, Some(scheduled_at)) => Ok(PostState::Posted { scheduled_at }),
            (status, scheduled_at) => Err(DomainError::Internal(format!(
                "inconsistent post state: status {} with scheduled_at {:?}",
                status, scheduled_at
            ))),
        }
    }
}

/// Post entity - a topic on its way to becoming a published post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub topic: String,
    pub post_type: PostType,
    pub draft: Option<String>,
    pub state: PostState,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new draft post. The topic is trimmed and must be non-empty
    /// and at most [`MAX_TOPIC_LEN`] characters.
    pub fn new(topic: &str, post_type: PostType) -> Result<Self, DomainError> {
        Self::new_at(topic, post_type, Utc::now())
    }

    pub fn new_at(
        topic: &str,
        post_type: PostType,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let topic = validate_topic(topic)?;
        Ok(Self {
            id: Uuid::new_v4(),
            topic,
            post_type,
            draft: None,
            state: PostState::Draft,
            created_at,
        })
    }

    pub fn status(&self) -> PostStatus {
        self.state.status()
    }

    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        self.state.scheduled_at()
    }

    /// An Approved post whose publish time has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        matches!(self.state, PostState::Approved { scheduled_at } if scheduled_at <= now)
    }
}

fn validate_topic(topic: &str) -> Result<String, DomainError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(DomainError::Validation("Topic is required".to_string()));
    }
    if topic.chars().count() > MAX_TOPIC_LEN {
        return Err(DomainError::Validation(format!(
            "Topic must be at most {} characters",
            MAX_TOPIC_LEN
        )));
    }
    Ok(topic.to_string())
}
