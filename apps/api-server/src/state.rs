//! Application state - shared across all handlers.

use std::sync::Arc;

use postmate_core::ports::{
    ContentGenerator, CredentialVerifier, MessagingGateway, PostStore, PublishingGateway,
};
use postmate_core::services::{
    ActivePostLocator, ConversationService, LatestActivePost, OrchestratorConfig,
    PostManagement, SchedulingOrchestrator, SenderSessionLocator,
};
use postmate_infra::auth::Argon2CredentialVerifier;
use postmate_infra::gateways::{
    GeminiConfig, GeminiGenerator, LinkedInConfig, LinkedInPublisher, WhatsAppConfig,
    WhatsAppMessenger,
};
use postmate_infra::{InMemoryConversationSessions, InMemoryPostStore};

#[cfg(feature = "postgres")]
use postmate_infra::database::{DatabaseConnections, PostgresPostStore};

use crate::config::{ActivePostSelection, AppConfig};

/// The adapters the services are built from.
pub struct Adapters {
    pub store: Arc<dyn PostStore>,
    /// Reported by the health endpoint.
    pub store_backend: &'static str,
    pub generator: Arc<dyn ContentGenerator>,
    pub messenger: Arc<dyn MessagingGateway>,
    pub publisher: Arc<dyn PublishingGateway>,
    pub credentials: Arc<dyn CredentialVerifier>,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub conversation: Arc<ConversationService>,
    pub posts: Arc<PostManagement>,
    pub orchestrator: Arc<SchedulingOrchestrator>,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub webhook_verify_token: Option<String>,
    pub store_backend: &'static str,
}

impl AppState {
    /// Build the application state from environment-configured adapters.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let (store, store_backend) = init_store(config).await;
        let adapters = Adapters {
            store,
            store_backend,
            generator: Arc::new(GeminiGenerator::new(GeminiConfig::from_env())?),
            messenger: Arc::new(WhatsAppMessenger::new(WhatsAppConfig::from_env())?),
            publisher: Arc::new(LinkedInPublisher::new(LinkedInConfig::from_env())?),
            credentials: Arc::new(Argon2CredentialVerifier::from_env()),
        };

        let state = Self::assemble(adapters, config, OrchestratorConfig::from_env());
        tracing::info!(
            selection = ?config.active_post_selection,
            "Application state initialized"
        );
        Ok(state)
    }

    /// Wire services over the given adapters.
    pub fn assemble(
        adapters: Adapters,
        config: &AppConfig,
        orchestrator_config: OrchestratorConfig,
    ) -> Self {
        let Adapters {
            store,
            store_backend,
            generator,
            messenger,
            publisher,
            credentials,
        } = adapters;

        let locator: Arc<dyn ActivePostLocator> = match config.active_post_selection {
            ActivePostSelection::Latest => Arc::new(LatestActivePost::new(store.clone())),
            ActivePostSelection::Sender => Arc::new(SenderSessionLocator::new(
                store.clone(),
                Arc::new(InMemoryConversationSessions::from_env()),
            )),
        };

        Self {
            conversation: Arc::new(ConversationService::new(
                store.clone(),
                locator,
                generator.clone(),
                messenger.clone(),
            )),
            posts: Arc::new(PostManagement::new(store.clone(), generator)),
            orchestrator: Arc::new(SchedulingOrchestrator::new(
                store,
                publisher,
                messenger,
                orchestrator_config,
            )),
            credentials,
            webhook_verify_token: config.webhook_verify_token.clone(),
            store_backend,
        }
    }
}

#[cfg(feature = "postgres")]
async fn init_store(config: &AppConfig) -> (Arc<dyn PostStore>, &'static str) {
    let Some(db_config) = config.database.as_ref() else {
        tracing::warn!("DATABASE_URL not set; posts are kept in memory only");
        return (Arc::new(InMemoryPostStore::new()), "memory");
    };

    match DatabaseConnections::init(db_config).await {
        Ok(connections) => (Arc::new(PostgresPostStore::new(connections.main)), "postgres"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database; using in-memory store");
            (Arc::new(InMemoryPostStore::new()), "memory")
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn init_store(_config: &AppConfig) -> (Arc<dyn PostStore>, &'static str) {
    tracing::info!("Built without the postgres feature; using in-memory post store");
    (Arc::new(InMemoryPostStore::new()), "memory")
}
