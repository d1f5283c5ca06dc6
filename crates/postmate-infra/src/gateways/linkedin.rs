//! LinkedIn UGC post publishing.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use postmate_core::error::GatewayError;
use postmate_core::ports::PublishingGateway;

use super::{ensure_success, env_opt, http_client, transport};

const DEFAULT_API_BASE: &str = "https://api.linkedin.com/v2";

#[derive(Debug, Clone)]
pub struct LinkedInConfig {
    pub access_token: Option<String>,
    /// e.g. `urn:li:person:abc123`
    pub author_urn: Option<String>,
    pub api_base: String,
    pub timeout: Duration,
}

impl LinkedInConfig {
    pub fn from_env() -> Self {
        Self {
            access_token: env_opt("LINKEDIN_ACCESS_TOKEN"),
            author_urn: env_opt("LINKEDIN_AUTHOR_URN"),
            api_base: env_opt("LINKEDIN_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            timeout: super::timeout_from_env(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UgcPost<'a> {
    author: &'a str,
    lifecycle_state: &'static str,
    specific_content: SpecificContent<'a>,
    visibility: Visibility,
}

#[derive(Debug, Serialize)]
struct SpecificContent<'a> {
    #[serde(rename = "com.linkedin.ugc.ShareContent")]
    share_content: ShareContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareContent<'a> {
    share_commentary: Commentary<'a>,
    share_media_category: &'static str,
}

#[derive(Debug, Serialize)]
struct Commentary<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Visibility {
    #[serde(rename = "com.linkedin.ugc.MemberNetworkVisibility")]
    member_network: &'static str,
}

impl<'a> UgcPost<'a> {
    fn public(author: &'a str, text: &'a str) -> Self {
        Self {
            author,
            lifecycle_state: "PUBLISHED",
            specific_content: SpecificContent {
                share_content: ShareContent {
                    share_commentary: Commentary { text },
                    share_media_category: "NONE",
                },
            },
            visibility: Visibility {
                member_network: "PUBLIC",
            },
        }
    }
}

/// Publishes text posts on behalf of the configured author.
pub struct LinkedInPublisher {
    client: reqwest::Client,
    config: LinkedInConfig,
}

impl LinkedInPublisher {
    pub fn new(config: LinkedInConfig) -> Result<Self, GatewayError> {
        if config.access_token.is_none() || config.author_urn.is_none() {
            tracing::warn!("LinkedIn credentials not configured; due posts will fail to publish");
        }
        Ok(Self {
            client: http_client(config.timeout)?,
            config,
        })
    }
}

#[async_trait]
impl PublishingGateway for LinkedInPublisher {
    async fn publish(&self, post_id: Uuid, text: &str) -> Result<(), GatewayError> {
        let (Some(token), Some(author)) = (
            self.config.access_token.as_deref(),
            self.config.author_urn.as_deref(),
        ) else {
            return Err(GatewayError::NotConfigured("LinkedIn"));
        };

        let url = format!("{}/ugcPosts", self.config.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&UgcPost::public(author, text))
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response).await?;

        tracing::info!(post_id = %post_id, "Post accepted by LinkedIn");
        Ok(())
    }
}
