//! Management endpoints for posts.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use postmate_core::domain::{Post, PostType};
use postmate_shared::ApiResponse;
use postmate_shared::dto::{CreatePostRequest, PostResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

pub fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        topic: post.topic,
        post_type: post.post_type.as_str().to_string(),
        draft: post.draft,
        status: post.state.status().as_str().to_string(),
        review_step: post.state.review_step().map(|s| s.as_str().to_string()),
        scheduled_at: post.state.scheduled_at(),
        created_at: post.created_at,
    }
}

/// GET /api/posts
pub async fn list(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    identity.require_operator()?;

    let posts: Vec<PostResponse> = state
        .posts
        .list()
        .await?
        .into_iter()
        .map(post_response)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// GET /api/posts/{id}
pub async fn get(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    identity.require_operator()?;

    let post = state.posts.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    identity.require_operator()?;

    let req = body.into_inner();
    let post_type: PostType = req.post_type.parse()?;
    let post = state.posts.create(&req.topic, post_type).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(post_response(post))))
}

/// POST /api/posts/{id}/approve
pub async fn approve(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    identity.require_operator()?;

    let post = state.posts.approve(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        post_response(post),
        "Post approved and scheduled",
    )))
}

/// POST /api/posts/{id}/reject
pub async fn reject(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    identity.require_operator()?;

    let post = state.posts.reject(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        post_response(post),
        "Post rejected",
    )))
}

/// POST /api/posts/{id}/regenerate
pub async fn regenerate(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    identity.require_operator()?;

    let post = state.posts.regenerate(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}
