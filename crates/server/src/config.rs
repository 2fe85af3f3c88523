//! # Application Configuration
//!
//! Configuration for `jewelrybox-server`, loaded in layers: programmatic
//! defaults, then an optional `config.yml` (with `${VAR}` environment
//! substitution), then environment variables. Top-level keys are overridden
//! by plain variables like `PORT`; nested keys by `JEWELRYBOX_`-prefixed
//! variables (e.g. `JEWELRYBOX_RETRIEVAL__TOP_K`). Every deployment variant
//! of the assistant is this one binary plus a different configuration file.

use config::{
    Config as ConfigBuilder, Environment, File, FileFormat, Value as ConfigValue,
    ValueKind as ConfigValueKind,
};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Comma-separated CORS origins; `*` allows any. Loaded from
    /// `ALLOWED_ORIGINS` env var.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
    /// Path to the persona JSON. Missing persona is fatal at startup.
    #[serde(default = "default_persona_path")]
    pub persona_path: String,
    /// Path to the intent catalog JSON. Missing file disables URL injection.
    #[serde(default = "default_intents_path")]
    pub intents_path: String,
    /// Directory holding the prebuilt `<domain>.db` vector indexes.
    #[serde(default = "default_indexes_dir")]
    pub indexes_dir: String,
    /// Path to the widget avatar image.
    #[serde(default = "default_avatar_path")]
    pub avatar_path: String,

    /// Knobs for the retrieval pass that runs before reply annotation.
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Configuration for the text embedding model.
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// A map of named, reusable AI provider configurations.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// The provider entry used for chat replies.
    #[serde(default = "default_chat_provider")]
    pub chat_provider: String,
}

fn default_port() -> u16 {
    9090
}
fn default_allowed_origins() -> String {
    "*".to_string()
}
fn default_persona_path() -> String {
    "prompts/persona.json".to_string()
}
fn default_intents_path() -> String {
    "prompts/intents.json".to_string()
}
fn default_indexes_dir() -> String {
    "indexes".to_string()
}
fn default_avatar_path() -> String {
    "assets/avatar.png".to_string()
}
fn default_chat_provider() -> String {
    "openai_default".to_string()
}

/// Retrieval knobs applied per chat request.
#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_retrieval_enabled")]
    pub enabled: bool,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

fn default_retrieval_enabled() -> bool {
    true
}
fn default_top_k() -> usize {
    jewelrybox::constants::DEFAULT_TOP_K
}
fn default_similarity_threshold() -> f64 {
    jewelrybox::constants::DEFAULT_SIMILARITY_THRESHOLD
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            enabled: default_retrieval_enabled(),
            top_k: default_top_k(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

/// Configuration for the embedding model provider.
#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_api_url")]
    pub api_url: String,
    #[serde(default = "default_embedding_model")]
    pub model_name: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_embedding_api_url() -> String {
    "https://api.openai.com/v1/embeddings".to_string()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_url: default_embedding_api_url(),
            model_name: default_embedding_model(),
            api_key: None,
        }
    }
}

/// A reusable configuration for a specific AI provider instance.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// The type of provider ("gemini" or "local"/OpenAI-compatible).
    pub provider: String,
    /// The API URL. Optional for Gemini where it can be derived.
    pub api_url: Option<String>,
    /// The API key, which can be null for local providers.
    pub api_key: Option<String>,
    pub model_name: String,
}

/// Constructs a `config::Value` map of the default provider entry. This is
/// the base layer; a `providers` section in `config.yml` replaces it.
fn build_default_providers() -> HashMap<String, ConfigValue> {
    let mut table = HashMap::new();
    table.insert("provider".to_string(), ConfigValue::from("local"));
    table.insert(
        "api_url".to_string(),
        ConfigValue::from("https://api.openai.com/v1/chat/completions"),
    );
    table.insert("model_name".to_string(), ConfigValue::from("gpt-4o-mini"));

    let mut providers = HashMap::new();
    providers.insert(
        "openai_default".to_string(),
        ConfigValue::new(None, ConfigValueKind::Table(table)),
    );
    providers
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").unwrap();
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_else(|_| "".to_string())
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration.
///
/// With no override, `config.yml` next to the crate manifest is used when
/// present; a missing file falls back to defaults plus environment
/// variables. An explicit `config_path_override` must exist.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults.
        .set_default("providers", build_default_providers())?;

    // Layer 2: Main config file (optional unless explicitly overridden).
    let main_config_path = match config_path_override {
        Some(override_path) => override_path.to_string(),
        None => format!("{}/config.yml", env!("CARGO_MANIFEST_DIR")),
    };
    match read_and_substitute(&main_config_path)? {
        Some(content) => {
            info!("Loading configuration from '{main_config_path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None if config_path_override.is_some() => {
            return Err(ConfigError::NotFound(format!(
                "Config file not found at '{main_config_path}'."
            )));
        }
        None => {
            info!("'{main_config_path}' not found, using defaults and environment variables.");
        }
    }

    let settings = builder
        // Layer 3: Environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 4: Prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("JEWELRYBOX")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    Ok(config)
}
