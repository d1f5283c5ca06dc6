//! PostgreSQL post store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use postmate_core::domain::{Post, PostState, PostStatus};
use postmate_core::error::RepoError;
use postmate_core::ports::{PostStore, WriteOutcome};

use super::entity::post::{self, Entity as PostEntity};

/// PostgreSQL implementation of [`PostStore`].
pub struct PostgresPostStore {
    db: DbConn,
}

impl PostgresPostStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn query_err(e: DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

fn to_posts(models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
    models.into_iter().map(Post::try_from).collect()
}

fn status_values(statuses: &[PostStatus]) -> Vec<&'static str> {
    statuses.iter().map(PostStatus::as_str).collect()
}

#[async_trait]
impl PostStore for PostgresPostStore {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let active_model: post::ActiveModel = post.into();
        let model = active_model.insert(&self.db).await.map_err(|e| {
            let err_str = e.to_string();
            if err_str.contains("duplicate") || err_str.contains("unique") {
                RepoError::Constraint("Post already exists".to_string())
            } else {
                RepoError::Query(err_str)
            }
        })?;

        Post::try_from(model)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?
            .map(Post::try_from)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;
        to_posts(models)
    }

    async fn find_latest_with_status(
        &self,
        statuses: &[PostStatus],
    ) -> Result<Option<Post>, RepoError> {
        PostEntity::find()
            .filter(post::Column::Status.is_in(status_values(statuses)))
            .order_by_desc(post::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(query_err)?
            .map(Post::try_from)
            .transpose()
    }

    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(post::Column::Status.eq(PostStatus::Approved.as_str()))
            .filter(post::Column::ScheduledAt.lte(now))
            .order_by_asc(post::Column::ScheduledAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;
        to_posts(models)
    }

    async fn update_if(
        &self,
        post: &Post,
        expected: &PostState,
    ) -> Result<WriteOutcome, RepoError> {
        let state = post.state;
        let mut update = PostEntity::update_many()
            .col_expr(post::Column::Draft, Expr::value(post.draft.clone()))
            .col_expr(post::Column::Status, Expr::value(state.status().as_str()))
            .col_expr(
                post::Column::ReviewStep,
                Expr::value(state.review_step().map(|s| s.as_str().to_string())),
            )
            .col_expr(
                post::Column::ScheduledAt,
                Expr::value(state.scheduled_at().map(|t| t.fixed_offset())),
            )
            .filter(post::Column::Id.eq(post.id))
            .filter(post::Column::Status.eq(expected.status().as_str()));
        if let Some(step) = expected.review_step() {
            update = update.filter(post::Column::ReviewStep.eq(step.as_str()));
        }
        let result = update.exec(&self.db).await.map_err(query_err)?;

        if result.rows_affected == 0 {
            tracing::debug!(post_id = %post.id, expected = ?expected, "Conditional update matched no row");
            return Ok(WriteOutcome::Conflict);
        }
        Ok(WriteOutcome::Applied)
    }
}
