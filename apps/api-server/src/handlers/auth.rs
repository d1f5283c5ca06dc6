//! Authentication handlers.

use actix_web::{HttpResponse, web};
use chrono::{TimeDelta, Utc};
use std::sync::Arc;

use postmate_core::ports::TokenService;
use postmate_shared::dto::{LoginRequest, LoginResponse};

use crate::middleware::auth::OPERATOR_ROLE;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let valid = state
        .credentials
        .verify(&req.username, &req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        tracing::warn!(username = %req.username, "Login rejected");
        return Err(AppError::Unauthorized);
    }

    let token = token_service
        .generate_token(&req.username, vec![OPERATOR_ROLE.to_string()])
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(username = %req.username, "Operator logged in");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_at: Utc::now() + TimeDelta::seconds(token_service.expiration_seconds()),
    }))
}
