//! WhatsApp webhook: subscription handshake and inbound messages.

use actix_web::{HttpResponse, web};

use postmate_shared::webhook::{WebhookPayload, WebhookVerifyQuery};

use crate::middleware::error::{AppError, AppResult};
use crate::observability::RequestId;
use crate::state::AppState;

/// GET /api/webhook/whatsapp
pub async fn verify(
    state: web::Data<AppState>,
    query: web::Query<WebhookVerifyQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let expected = state.webhook_verify_token.as_deref();

    let subscribed = query.mode.as_deref() == Some("subscribe");
    let token_ok = expected.is_some() && query.verify_token.as_deref() == expected;

    if subscribed && token_ok {
        tracing::info!("WhatsApp webhook verified");
        return Ok(HttpResponse::Ok()
            .content_type("text/plain")
            .body(query.challenge.unwrap_or_default()));
    }

    tracing::warn!(mode = ?query.mode, "WhatsApp webhook verification failed");
    Err(AppError::Forbidden)
}

/// POST /api/webhook/whatsapp
///
/// Always answers 200 once the payload parses; failures are reported to the
/// sender over WhatsApp, never to the platform.
pub async fn receive(
    state: web::Data<AppState>,
    request_id: RequestId,
    body: web::Json<WebhookPayload>,
) -> HttpResponse {
    let payload = body.into_inner();

    let mut handled = 0usize;
    for (sender, text) in payload.messages() {
        if let Some(result) = state.conversation.handle_message(sender, text).await {
            tracing::debug!(
                request_id = %request_id.as_str(),
                sender = %sender,
                post_id = ?result.post_id,
                delivered = result.delivered,
                "Message handled"
            );
            handled += 1;
        }
    }

    if handled == 0 {
        tracing::debug!(request_id = %request_id.as_str(), "Webhook carried no text messages");
    }

    HttpResponse::Ok().finish()
}
