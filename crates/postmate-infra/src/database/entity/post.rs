//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use postmate_core::domain::{Post, PostState, PostStatus, PostType, ReviewStep};
use postmate_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub topic: String,
    pub post_type: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub draft: Option<String>,
    pub status: String,
    pub review_step: Option<String>,
    pub scheduled_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn corrupt(id: Uuid, err: impl std::fmt::Display) -> RepoError {
    RepoError::Corrupt(format!("post {}: {}", id, err))
}

/// Conversion from SeaORM Model to Domain Post.
///
/// Rows whose columns describe a state the lifecycle can't reach are refused.
impl TryFrom<Model> for Post {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = model.id;
        let status: PostStatus = model.status.parse().map_err(|e| corrupt(id, e))?;
        let post_type: PostType = model.post_type.parse().map_err(|e| corrupt(id, e))?;
        let review_step = model
            .review_step
            .as_deref()
            .map(str::parse::<ReviewStep>)
            .transpose()
            .map_err(|e| corrupt(id, e))?;
        let state = PostState::from_parts(status, review_step, model.scheduled_at.map(Into::into))
            .map_err(|e| corrupt(id, e))?;

        Ok(Post {
            id,
            topic: model.topic,
            post_type,
            draft: model.draft,
            state,
            created_at: model.created_at.into(),
        })
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            topic: Set(post.topic),
            post_type: Set(post.post_type.as_str().to_string()),
            draft: Set(post.draft),
            status: Set(post.state.status().as_str().to_string()),
            review_step: Set(post.state.review_step().map(|s| s.as_str().to_string())),
            scheduled_at: Set(post.state.scheduled_at().map(Into::into)),
            created_at: Set(post.created_at.into()),
        }
    }
}
