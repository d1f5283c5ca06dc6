//! WhatsApp Cloud API webhook payloads.
//!
//! Only the fields the server reads are modelled; everything else in the
//! payload is ignored.

use serde::{Deserialize, Serialize};

/// Query of the subscription handshake (`GET` on the webhook).
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookVerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: WebhookValue,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookValue {
    #[serde(default)]
    pub messaging_product: String,
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundMessage {
    pub from: String,
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub text: Option<InboundText>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundText {
    #[serde(default)]
    pub body: String,
}

impl WebhookPayload {
    /// Every message in the payload as `(sender, text)`. Non-text messages
    /// yield an empty text.
    pub fn messages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entry
            .iter()
            .flat_map(|e| &e.changes)
            .flat_map(|c| &c.value.messages)
            .map(|m| {
                let body = m.text.as_ref().map(|t| t.body.as_str()).unwrap_or("");
                (m.from.as_str(), body)
            })
    }
}
