//! Fakes and app wiring shared by the server tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use postmate_core::domain::PostType;
use postmate_core::error::GatewayError;
use postmate_core::ports::{ContentGenerator, MessagingGateway, PublishingGateway, TokenService};
use postmate_core::services::OrchestratorConfig;
use postmate_infra::auth::hash_password;
use postmate_infra::{Argon2CredentialVerifier, InMemoryPostStore, JwtConfig, JwtTokenService};

use crate::config::{ActivePostSelection, AppConfig};
use crate::state::{Adapters, AppState};

pub const VERIFY_TOKEN: &str = "verify-me";
pub const OPERATOR: &str = "admin";
pub const PASSWORD: &str = "correct horse";

pub struct StubGenerator;

#[async_trait]
impl ContentGenerator for StubGenerator {
    async fn generate(&self, topic: &str, _post_type: PostType) -> Result<String, GatewayError> {
        Ok(format!("Draft about {topic}"))
    }
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMessenger {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingGateway for RecordingMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<(), GatewayError> {
        self.sent.lock().unwrap().push((to.to_string(), body.to_string()));
        Ok(())
    }
}

pub struct NullPublisher;

#[async_trait]
impl PublishingGateway for NullPublisher {
    async fn publish(&self, _post_id: Uuid, _text: &str) -> Result<(), GatewayError> {
        Ok(())
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        database: None,
        webhook_verify_token: Some(VERIFY_TOKEN.into()),
        active_post_selection: ActivePostSelection::Latest,
    }
}

/// State over in-memory adapters, plus the messenger to inspect replies.
pub fn test_state() -> (AppState, Arc<RecordingMessenger>) {
    let messenger = Arc::new(RecordingMessenger::default());
    let hash = hash_password(PASSWORD).unwrap();
    let adapters = Adapters {
        store: Arc::new(InMemoryPostStore::new()),
        store_backend: "memory",
        generator: Arc::new(StubGenerator),
        messenger: messenger.clone(),
        publisher: Arc::new(NullPublisher),
        credentials: Arc::new(Argon2CredentialVerifier::new(OPERATOR, Some(hash))),
    };
    let state = AppState::assemble(adapters, &test_config(), OrchestratorConfig::default());
    (state, messenger)
}

pub fn test_tokens() -> Arc<dyn TokenService> {
    Arc::new(JwtTokenService::new(JwtConfig {
        secret: "handler-test-secret-handler-test-secret".into(),
        expiration_hours: 1,
        issuer: "postmate-test".into(),
    }))
}
