//! HTTP adapters for the messaging, publishing and generation ports.

mod gemini;
mod linkedin;
mod whatsapp;

use std::time::Duration;

use postmate_core::error::GatewayError;

pub use gemini::{GeminiConfig, GeminiGenerator};
pub use linkedin::{LinkedInConfig, LinkedInPublisher};
pub use whatsapp::{WhatsAppConfig, WhatsAppMessenger};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Request timeout shared by every gateway, from `HTTP_TIMEOUT_SECS`.
pub fn timeout_from_env() -> Duration {
    let secs = std::env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, GatewayError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {}", e)))
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Turn a non-2xx response into [`GatewayError::Rejected`].
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Rejected {
        status: status.as_u16(),
        body,
    })
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}
