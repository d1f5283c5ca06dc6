//! WhatsApp Cloud API messaging.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use postmate_core::error::GatewayError;
use postmate_core::ports::MessagingGateway;

use super::{ensure_success, env_opt, http_client, transport};

const DEFAULT_API_BASE: &str = "https://graph.facebook.com/v22.0";

#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub access_token: Option<String>,
    pub phone_number_id: Option<String>,
    pub api_base: String,
    pub timeout: Duration,
}

impl WhatsAppConfig {
    pub fn from_env() -> Self {
        Self {
            access_token: env_opt("WHATSAPP_ACCESS_TOKEN"),
            phone_number_id: env_opt("WHATSAPP_PHONE_NUMBER_ID"),
            api_base: env_opt("WHATSAPP_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            timeout: super::timeout_from_env(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextBody<'a>,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

/// Sends plain text messages through the Graph API.
pub struct WhatsAppMessenger {
    client: reqwest::Client,
    config: WhatsAppConfig,
}

impl WhatsAppMessenger {
    pub fn new(config: WhatsAppConfig) -> Result<Self, GatewayError> {
        if config.access_token.is_none() || config.phone_number_id.is_none() {
            tracing::warn!("WhatsApp credentials not configured; replies will not be delivered");
        }
        Ok(Self {
            client: http_client(config.timeout)?,
            config,
        })
    }

    fn messages_url(&self, phone_number_id: &str) -> String {
        format!(
            "{}/{}/messages",
            self.config.api_base.trim_end_matches('/'),
            phone_number_id
        )
    }
}

#[async_trait]
impl MessagingGateway for WhatsAppMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<(), GatewayError> {
        let (Some(token), Some(phone_number_id)) = (
            self.config.access_token.as_deref(),
            self.config.phone_number_id.as_deref(),
        ) else {
            return Err(GatewayError::NotConfigured("WhatsApp"));
        };

        let request = SendMessageRequest {
            messaging_product: "whatsapp",
            to,
            kind: "text",
            text: TextBody { body },
        };

        let response = self
            .client
            .post(self.messages_url(phone_number_id))
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response).await?;

        tracing::debug!(to = %to, "WhatsApp message sent");
        Ok(())
    }
}
