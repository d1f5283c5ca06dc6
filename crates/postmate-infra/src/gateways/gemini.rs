//! Draft generation with Google's Gemini `generateContent` API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use postmate_core::domain::PostType;
use postmate_core::error::GatewayError;
use postmate_core::ports::ContentGenerator;

use super::{ensure_success, env_opt, http_client, transport};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_opt("GEMINI_API_KEY"),
            model: env_opt("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: env_opt("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            timeout: super::timeout_from_env(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .map(|t| t.trim().to_string())
            .find(|t| !t.is_empty())
    }
}

fn style_for(post_type: PostType) -> &'static str {
    match post_type {
        PostType::Educational => {
            "Explain the idea clearly, define key terms and give one concrete example."
        }
        PostType::Listicle => "Structure it as a short numbered list of practical points.",
        PostType::Storytelling => {
            "Tell it as a short personal story with a clear lesson at the end."
        }
        PostType::ThoughtLeadership => {
            "Take a clear, well-argued position and invite discussion."
        }
        PostType::Interview => "Write it as a brief question-and-answer exchange.",
        PostType::Difference => "Contrast two related ideas and explain how they differ.",
    }
}

/// Build the generation prompt for a topic and post type.
pub(crate) fn prompt(topic: &str, post_type: PostType) -> String {
    format!(
        "Write a professional LinkedIn post about {topic}. \
         Style: {style} \
         Tone: professional but human, engaging. \
         Length: 5-7 sentences, in up to 2 paragraphs, with headings only where they help. \
         Avoid jargon. \
         Put 2-3 relevant hashtags on a new line at the bottom. \
         Make it shareable and thought-provoking.",
        style = style_for(post_type)
    )
}

pub struct GeminiGenerator {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiGenerator {
    pub fn new(config: GeminiConfig) -> Result<Self, GatewayError> {
        if config.api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY not set; draft generation will fail");
        }
        Ok(Self {
            client: http_client(config.timeout)?,
            config,
        })
    }
}

#[async_trait]
impl ContentGenerator for GeminiGenerator {
    async fn generate(&self, topic: &str, post_type: PostType) -> Result<String, GatewayError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(GatewayError::NotConfigured("Gemini"));
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt(topic, post_type)),
                }],
            }],
        };

        let response = self
            .client
            .post(url)
            .header("X-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        let response = ensure_success(response).await?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let text = body
            .first_text()
            .ok_or_else(|| GatewayError::InvalidResponse("no text in candidates".to_string()))?;
        tracing::debug!(topic = %topic, post_type = %post_type, "Draft generated");
        Ok(text)
    }
}
