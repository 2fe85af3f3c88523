//! # Configuration Tests
//!
//! Tests for the layered configuration loading: programmatic defaults, the
//! optional YAML file, `${VAR}` substitution, and environment overrides.

use jewelrybox_server::config::{get_config, ConfigError};
use std::env;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

// A mutex to ensure that tests modifying the environment run sequentially.
// Environment variables are a shared, global resource, and cargo's default
// parallel test execution would otherwise let them interfere.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Clears every environment variable the loader consults.
fn clear_env_vars() {
    env::remove_var("PORT");
    env::remove_var("ALLOWED_ORIGINS");
    env::remove_var("PERSONA_PATH");
    env::remove_var("INTENTS_PATH");
    env::remove_var("INDEXES_DIR");
    env::remove_var("CHAT_PROVIDER");
    env::remove_var("JEWELRYBOX_RETRIEVAL__TOP_K");
    env::remove_var("JEWELRYBOX_RETRIEVAL__ENABLED");
    env::remove_var("JEWELRYBOX_EMBEDDING__MODEL_NAME");
    env::remove_var("JB_TEST_EMBEDDING_KEY");
}

/// Writes `content` as a config file and loads it.
fn load_from_yaml(content: &str) -> Result<jewelrybox_server::config::AppConfig, ConfigError> {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(&path, content).unwrap();
    get_config(Some(path.to_str().unwrap()))
}

#[test]
fn defaults_apply_when_the_file_is_minimal() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    let config = load_from_yaml("{}").expect("Configuration should load successfully");

    assert_eq!(config.port, 9090);
    assert_eq!(config.allowed_origins, "*");
    assert_eq!(config.persona_path, "prompts/persona.json");
    assert_eq!(config.intents_path, "prompts/intents.json");
    assert_eq!(config.indexes_dir, "indexes");
    assert!(config.retrieval.enabled);
    assert_eq!(config.retrieval.top_k, 3);
    assert_eq!(config.retrieval.similarity_threshold, 0.75);
    assert_eq!(config.embedding.model_name, "text-embedding-3-small");
    assert_eq!(config.chat_provider, "openai_default");

    let default_provider = config
        .providers
        .get("openai_default")
        .expect("default provider entry should exist");
    assert_eq!(default_provider.provider, "local");
    assert_eq!(default_provider.model_name, "gpt-4o-mini");

    clear_env_vars();
}

#[test]
fn file_values_override_defaults() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    let config = load_from_yaml(
        r#"
port: 7777
intents_path: "conf/my_intents.json"
retrieval:
  top_k: 5
  similarity_threshold: 0.6
"#,
    )
    .expect("Configuration should load successfully");

    assert_eq!(config.port, 7777);
    assert_eq!(config.intents_path, "conf/my_intents.json");
    assert_eq!(config.retrieval.top_k, 5);
    assert_eq!(config.retrieval.similarity_threshold, 0.6);
    // Untouched keys keep their defaults.
    assert!(config.retrieval.enabled);
    assert_eq!(config.persona_path, "prompts/persona.json");

    clear_env_vars();
}

#[test]
fn environment_overrides_file_values() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    env::set_var("PORT", "9999");
    env::set_var("JEWELRYBOX_RETRIEVAL__TOP_K", "7");
    env::set_var("JEWELRYBOX_EMBEDDING__MODEL_NAME", "custom-embedder");

    let config = load_from_yaml("port: 7777\n").expect("Configuration should load successfully");

    assert_eq!(config.port, 9999);
    assert_eq!(config.retrieval.top_k, 7);
    assert_eq!(config.embedding.model_name, "custom-embedder");

    clear_env_vars();
}

#[test]
fn file_variables_are_substituted_from_the_environment() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    env::set_var("JB_TEST_EMBEDDING_KEY", "secret-from-env");
    let config = load_from_yaml(
        r#"
embedding:
  api_key: "${JB_TEST_EMBEDDING_KEY}"
"#,
    )
    .expect("Configuration should load successfully");

    assert_eq!(config.embedding.api_key.as_deref(), Some("secret-from-env"));

    clear_env_vars();
}

#[test]
fn missing_override_path_is_not_found() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env_vars();

    let result = get_config(Some("/definitely/not/here/config.yml"));
    assert!(matches!(result.unwrap_err(), ConfigError::NotFound(_)));

    clear_env_vars();
}
