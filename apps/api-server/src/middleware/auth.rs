//! Bearer-token authentication for the management API.

use std::future::{Ready, ready};
use std::sync::Arc;

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, http::StatusCode,
    http::header, web,
};
use postmate_core::ports::{AuthError, TokenClaims, TokenService};
use postmate_shared::ErrorResponse;

use crate::middleware::error::AppError;

/// Role granted to the operator at login; required by the post endpoints.
pub const OPERATOR_ROLE: &str = "operator";

/// Authenticated caller. Extracting it fails with 401 unless the request
/// carries a valid `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub subject: String,
    pub roles: Vec<String>,
}

impl Identity {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Fail with 403 unless the operator role is present.
    pub fn require_operator(&self) -> Result<(), AppError> {
        if self.has_role(OPERATOR_ROLE) {
            Ok(())
        } else {
            tracing::warn!(subject = %self.subject, "Token lacks operator role");
            Err(AppError::Forbidden)
        }
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            subject: claims.subject,
            roles: claims.roles,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct AuthenticationError(#[from] pub AuthError);

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AuthError::TokenExpired | AuthError::InvalidToken(_) | AuthError::MissingAuth => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let problem = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::titled(401, "Token Expired")
                .with_detail("Log in again to get a new token."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::titled(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::titled(401, "Authentication Required")
                .with_detail("Send `Authorization: Bearer <token>` from /api/auth/login."),
            _ => ErrorResponse::new(status.as_u16()),
        };
        HttpResponse::build(status).json(problem)
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let Some(tokens) = req.app_data::<web::Data<Arc<dyn TokenService>>>() else {
        tracing::error!("TokenService not registered as app data");
        return Err(AuthError::InvalidToken("Server configuration error".to_string()));
    };
    let claims = tokens.validate_token(bearer_token(req)?)?;
    Ok(Identity::from(claims))
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(AuthenticationError))
    }
}
