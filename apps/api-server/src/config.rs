//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use postmate_infra::database::DatabaseConfig;

/// How a conversational reply finds the post it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivePostSelection {
    /// Most recent active post, shared by every sender.
    #[default]
    Latest,
    /// The post each sender last created.
    Sender,
}

impl FromStr for ActivePostSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(Self::Latest),
            "sender" => Ok(Self::Sender),
            other => Err(format!("unknown active post selection '{}'", other)),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Token WhatsApp echoes back during the webhook handshake.
    pub webhook_verify_token: Option<String>,
    pub active_post_selection: ActivePostSelection,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let active_post_selection = match env::var("ACTIVE_POST_SELECTION") {
            Ok(value) => value.parse().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Falling back to latest active post selection");
                ActivePostSelection::Latest
            }),
            Err(_) => ActivePostSelection::Latest,
        };

        let webhook_verify_token = env::var("WHATSAPP_VERIFY_TOKEN")
            .ok()
            .filter(|v| !v.trim().is_empty());
        if webhook_verify_token.is_none() {
            tracing::warn!("WHATSAPP_VERIFY_TOKEN not set; webhook verification will fail");
        }

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database: DatabaseConfig::from_env(),
            webhook_verify_token,
            active_post_selection,
        }
    }
}
