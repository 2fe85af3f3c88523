//! # Application State
//!
//! The shared application state and the logic for building it at startup:
//! persona rendering (fatal when missing), intent catalog loading (degrades
//! to no URL injection), AI provider instantiation, and the retrieval
//! pipeline wiring. Everything in here is immutable after startup except
//! the session store.

use crate::assets;
use crate::config::AppConfig;
use crate::sessions::SessionStore;
use jewelrybox::classifier::DomainClassifier;
use jewelrybox::intents::{default_domains, IntentCatalog};
use jewelrybox::prompts::PersonaConfig;
use jewelrybox::providers::ai::{
    gemini::GeminiProvider, local::LocalAiProvider, AiProvider, ApiEmbedder, Embedder,
};
use jewelrybox::search::{IndexRouter, SmartRetriever, VectorRetriever};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// The fully rendered persona system prompt.
    pub system_prompt: Arc<String>,
    /// The validated intent catalog driving URL injection.
    pub catalog: Arc<IntentCatalog>,
    /// Instantiated AI providers, keyed by their name from the config.
    pub ai_providers: Arc<HashMap<String, Box<dyn AiProvider>>>,
    /// The smart retrieval orchestrator.
    pub retriever: Arc<SmartRetriever>,
    /// Session-keyed chat history.
    pub sessions: Arc<SessionStore>,
    /// The widget avatar as a data URI (or the hosted placeholder).
    pub avatar_uri: Arc<String>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("system_prompt", &self.system_prompt)
            .field("providers", &self.ai_providers.keys().collect::<Vec<_>>())
            .field("avatar_uri", &self.avatar_uri)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// The provider used for chat replies, per `chat_provider` in the config.
    pub fn chat_provider(&self) -> anyhow::Result<&dyn AiProvider> {
        let name = &self.config.chat_provider;
        self.ai_providers
            .get(name)
            .map(|provider| provider.as_ref())
            .ok_or_else(|| anyhow::anyhow!("Chat provider '{name}' not found in configuration"))
    }
}

/// Builds the shared application state from the configuration.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    // The persona is the one piece of configuration the service cannot run
    // without; its absence aborts startup.
    let persona = PersonaConfig::from_file(&config.persona_path).map_err(|e| {
        anyhow::anyhow!(
            "Persona configuration is missing or invalid at '{}': {e}. Aborting startup.",
            config.persona_path
        )
    })?;
    let system_prompt = persona.render_system_prompt();

    // The intent catalog degrades to empty when the file is missing; a
    // malformed or inconsistent file is still a startup error.
    let catalog = IntentCatalog::load(&config.intents_path)?;

    // Create a map of AI provider instances from the configuration.
    let mut ai_providers: HashMap<String, Box<dyn AiProvider>> = HashMap::new();
    for (name, provider_config) in &config.providers {
        let provider: Box<dyn AiProvider> = match provider_config.provider.as_str() {
            "gemini" => {
                let api_key = provider_config.api_key.clone().ok_or_else(|| {
                    anyhow::anyhow!("api_key is required for gemini provider '{name}'")
                })?;
                // If api_url is not provided in config, construct it from the model name.
                let api_url = provider_config.api_url.clone().unwrap_or_else(|| {
                    format!(
                        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                        provider_config.model_name
                    )
                });
                Box::new(GeminiProvider::new(api_url, api_key)?)
            }
            "local" => {
                // For local/OpenAI-compatible providers, the URL is always required.
                let api_url = provider_config.api_url.clone().ok_or_else(|| {
                    anyhow::anyhow!("api_url is required for local provider '{name}'")
                })?;
                Box::new(LocalAiProvider::new(
                    api_url,
                    provider_config.api_key.clone(),
                    Some(provider_config.model_name.clone()),
                )?)
            }
            _ => {
                return Err(anyhow::anyhow!(
                    "Unsupported AI provider type '{}' for provider '{}'",
                    provider_config.provider,
                    name
                ));
            }
        };
        ai_providers.insert(name.clone(), provider);
    }

    // Wire the retrieval pipeline: classifier profiles come from the intent
    // configuration when declared, the built-in taxonomy otherwise.
    let embedder: Arc<dyn Embedder> = Arc::new(ApiEmbedder::new(
        config.embedding.api_url.clone(),
        config.embedding.model_name.clone(),
        config.embedding.api_key.clone(),
    )?);
    let domains = if catalog.domains().is_empty() {
        default_domains()
    } else {
        catalog.domains().to_vec()
    };
    let labels: Vec<String> = domains.iter().map(|d| d.label.clone()).collect();
    let classifier = DomainClassifier::new(domains);
    let router = IndexRouter::from_dir(&config.indexes_dir, labels);
    let retriever = SmartRetriever::new(
        classifier,
        router,
        Arc::new(VectorRetriever::new(embedder)),
    );

    let avatar_uri = assets::load_avatar_data_uri(&config.avatar_path);

    info!(
        intents = catalog.records().len(),
        retrieval_enabled = config.retrieval.enabled,
        "Application state initialized"
    );

    Ok(AppState {
        config: Arc::new(config),
        system_prompt: Arc::new(system_prompt),
        catalog: Arc::new(catalog),
        ai_providers: Arc::new(ai_providers),
        retriever: Arc::new(retriever),
        sessions: Arc::new(SessionStore::new()),
        avatar_uri: Arc::new(avatar_uri),
    })
}
