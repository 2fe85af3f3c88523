//! # Intent Configuration
//!
//! The static configuration behind URL injection and domain classification:
//! ordered intent records (trigger synonyms plus exactly one call-to-action
//! URL), the separate high-confidence trigger-phrase table, and the weighted
//! keyword profiles the classifier scores against.
//!
//! Declaration order in the configuration file is significant: tie-breaks in
//! classification and first-match-wins scans in URL resolution both follow
//! it, so the schema is an ordered JSON array rather than an object.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while loading or validating the intent configuration.
#[derive(Error, Debug)]
pub enum IntentConfigError {
    #[error("Failed to read intent configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse intent configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate intent key '{0}'")]
    DuplicateKey(String),
    #[error("Intent '{0}' has an empty call-to-action URL")]
    EmptyUrl(String),
    #[error("Trigger phrase table references unknown intent key '{0}'")]
    UnknownTriggerKey(String),
}

/// A static mapping from an intent key to its trigger synonyms and exactly
/// one call-to-action URL. Immutable after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRecord {
    pub key: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    pub url: String,
}

/// A high-confidence entry: exact phrases that resolve straight to an intent
/// key, consulted before any synonym or passage matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerPhrases {
    pub key: String,
    #[serde(default)]
    pub phrases: Vec<String>,
}

fn default_weight() -> f64 {
    1.0
}

/// A weighted keyword profile for one classification domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainProfile {
    pub label: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// On-disk shape of `intents.json`. Every section is optional so a partial
/// file still loads with documented defaults.
#[derive(Debug, Deserialize)]
struct IntentCatalogFile {
    #[serde(default)]
    domains: Vec<DomainProfile>,
    #[serde(default)]
    intents: Vec<IntentRecord>,
    #[serde(default)]
    triggers: Vec<TriggerPhrases>,
}

/// The loaded intent configuration. An empty catalog is valid and means URL
/// injection never fires.
#[derive(Debug, Clone, Default)]
pub struct IntentCatalog {
    domains: Vec<DomainProfile>,
    intents: Vec<IntentRecord>,
    triggers: Vec<TriggerPhrases>,
}

impl IntentCatalog {
    /// Builds a catalog from already-parsed parts, normalizing all match
    /// phrases to lowercase. This constructor does not validate; loaders
    /// call [`IntentCatalog::validate`] so configuration problems surface at
    /// startup rather than as silent no-ops at request time.
    pub fn new(
        domains: Vec<DomainProfile>,
        intents: Vec<IntentRecord>,
        triggers: Vec<TriggerPhrases>,
    ) -> Self {
        let lower = |phrases: Vec<String>| -> Vec<String> {
            phrases.into_iter().map(|p| p.to_lowercase()).collect()
        };
        Self {
            domains: domains
                .into_iter()
                .map(|d| DomainProfile {
                    label: d.label,
                    keywords: lower(d.keywords),
                    weight: d.weight,
                })
                .collect(),
            intents: intents
                .into_iter()
                .map(|i| IntentRecord {
                    key: i.key,
                    synonyms: lower(i.synonyms),
                    url: i.url,
                })
                .collect(),
            triggers: triggers
                .into_iter()
                .map(|t| TriggerPhrases {
                    key: t.key,
                    phrases: lower(t.phrases),
                })
                .collect(),
        }
    }

    /// Checks the catalog's internal consistency: unique intent keys,
    /// non-empty URLs, and every trigger entry referencing a known key.
    pub fn validate(&self) -> Result<(), IntentConfigError> {
        let mut keys = HashSet::new();
        for record in &self.intents {
            if !keys.insert(record.key.as_str()) {
                return Err(IntentConfigError::DuplicateKey(record.key.clone()));
            }
            if record.url.trim().is_empty() {
                return Err(IntentConfigError::EmptyUrl(record.key.clone()));
            }
        }
        for trigger in &self.triggers {
            if !keys.contains(trigger.key.as_str()) {
                return Err(IntentConfigError::UnknownTriggerKey(trigger.key.clone()));
            }
        }
        Ok(())
    }

    /// Parses and validates a catalog from JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self, IntentConfigError> {
        let file: IntentCatalogFile = serde_json::from_str(raw)?;
        let catalog = Self::new(file.domains, file.intents, file.triggers);
        catalog.validate()?;
        Ok(catalog)
    }

    /// Loads the catalog from `path`. A missing file degrades to an empty
    /// catalog (no URL injection ever fires) instead of failing startup; a
    /// present but malformed or inconsistent file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IntentConfigError> {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    path = %path.display(),
                    "Intent configuration not found, URL injection is disabled"
                );
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let catalog = Self::from_json_str(&raw)?;
        info!(
            path = %path.display(),
            intents = catalog.intents.len(),
            triggers = catalog.triggers.len(),
            "Loaded intent configuration"
        );
        Ok(catalog)
    }

    /// Intent records in declaration order.
    pub fn records(&self) -> &[IntentRecord] {
        &self.intents
    }

    /// The high-confidence trigger table in declaration order.
    pub fn triggers(&self) -> &[TriggerPhrases] {
        &self.triggers
    }

    /// Domain profiles for the classifier, in declaration order. Empty when
    /// the configuration does not override [`default_domains`].
    pub fn domains(&self) -> &[DomainProfile] {
        &self.domains
    }

    /// Looks up one intent record by key.
    pub fn get(&self, key: &str) -> Option<&IntentRecord> {
        self.intents.iter().find(|record| record.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty() && self.triggers.is_empty()
    }
}

/// The built-in jewelry domain taxonomy, used whenever the configuration
/// file does not declare its own `domains` section.
pub fn default_domains() -> Vec<DomainProfile> {
    let profile = |label: &str, keywords: &[&str], weight: f64| DomainProfile {
        label: label.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        weight,
    };
    vec![
        profile(
            "products",
            &[
                "diamond",
                "ring",
                "necklace",
                "bracelet",
                "earring",
                "pendant",
                "jewelry",
                "gemstone",
                "watch",
                "engagement",
                "wedding band",
            ],
            2.0,
        ),
        profile(
            "services",
            &[
                "repair",
                "resize",
                "resizing",
                "appraisal",
                "cleaning",
                "custom design",
                "engraving",
                "appointment",
                "consultation",
            ],
            2.0,
        ),
        profile(
            "education",
            &[
                "what is",
                "how to",
                "difference between",
                "4cs",
                "clarity",
                "carat",
                "color grade",
                "lab grown",
                "certification",
            ],
            1.5,
        ),
        profile(
            "commercial",
            &[
                "price",
                "cost",
                "buy",
                "purchase",
                "financing",
                "sale",
                "discount",
                "trade in",
                "warranty",
                "return policy",
            ],
            1.5,
        ),
    ]
}
