//! Tests for intent catalog loading/validation and domain classification.

use jewelrybox::classifier::{DomainClassifier, GENERAL_DOMAIN};
use jewelrybox::intents::{
    default_domains, DomainProfile, IntentCatalog, IntentConfigError, IntentRecord, TriggerPhrases,
};
use std::fs;
use tempfile::tempdir;

fn record(key: &str, synonyms: &[&str], url: &str) -> IntentRecord {
    IntentRecord {
        key: key.to_string(),
        synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        url: url.to_string(),
    }
}

fn trigger(key: &str, phrases: &[&str]) -> TriggerPhrases {
    TriggerPhrases {
        key: key.to_string(),
        phrases: phrases.iter().map(|s| s.to_string()).collect(),
    }
}

fn profile(label: &str, keywords: &[&str], weight: f64) -> DomainProfile {
    DomainProfile {
        label: label.to_string(),
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        weight,
    }
}

#[test]
fn load_missing_file_yields_empty_catalog() {
    let dir = tempdir().unwrap();
    let catalog = IntentCatalog::load(dir.path().join("intents.json")).unwrap();
    assert!(catalog.is_empty());
    assert!(catalog.records().is_empty());
    assert!(catalog.triggers().is_empty());
}

#[test]
fn load_parses_and_keeps_declaration_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("intents.json");
    fs::write(
        &path,
        r#"{
            "intents": [
                {"key": "browse_diamonds", "synonyms": ["Diamonds"], "url": "https://x/diamonds"},
                {"key": "appointment", "synonyms": ["book a visit"], "url": "https://x/appointment"}
            ],
            "triggers": [
                {"key": "appointment", "phrases": ["Schedule"]}
            ]
        }"#,
    )
    .unwrap();

    let catalog = IntentCatalog::load(&path).unwrap();
    assert_eq!(catalog.records().len(), 2);
    assert_eq!(catalog.records()[0].key, "browse_diamonds");
    assert_eq!(catalog.records()[1].key, "appointment");
    // Match phrases are normalized to lowercase at load time.
    assert_eq!(catalog.records()[0].synonyms, vec!["diamonds"]);
    assert_eq!(catalog.triggers()[0].phrases, vec!["schedule"]);
    assert_eq!(
        catalog.get("appointment").map(|r| r.url.as_str()),
        Some("https://x/appointment")
    );
}

#[test]
fn trigger_referencing_unknown_key_is_rejected_at_load() {
    let raw = r#"{
        "intents": [
            {"key": "browse_diamonds", "synonyms": ["diamonds"], "url": "https://x/diamonds"}
        ],
        "triggers": [
            {"key": "appointment", "phrases": ["schedule"]}
        ]
    }"#;
    let err = IntentCatalog::from_json_str(raw).unwrap_err();
    assert!(matches!(
        err,
        IntentConfigError::UnknownTriggerKey(key) if key == "appointment"
    ));
}

#[test]
fn validate_catches_unknown_trigger_key_programmatically() {
    let catalog = IntentCatalog::new(
        Vec::new(),
        vec![record("browse_diamonds", &["diamonds"], "https://x/diamonds")],
        vec![trigger("ghost", &["schedule"])],
    );
    assert!(matches!(
        catalog.validate().unwrap_err(),
        IntentConfigError::UnknownTriggerKey(key) if key == "ghost"
    ));
}

#[test]
fn duplicate_intent_key_is_rejected() {
    let catalog = IntentCatalog::new(
        Vec::new(),
        vec![
            record("browse_diamonds", &["diamonds"], "https://x/diamonds"),
            record("browse_diamonds", &["stones"], "https://x/stones"),
        ],
        Vec::new(),
    );
    assert!(matches!(
        catalog.validate().unwrap_err(),
        IntentConfigError::DuplicateKey(key) if key == "browse_diamonds"
    ));
}

#[test]
fn empty_url_is_rejected() {
    let catalog = IntentCatalog::new(
        Vec::new(),
        vec![record("browse_diamonds", &["diamonds"], "  ")],
        Vec::new(),
    );
    assert!(matches!(
        catalog.validate().unwrap_err(),
        IntentConfigError::EmptyUrl(key) if key == "browse_diamonds"
    ));
}

#[test]
fn classifier_picks_highest_weighted_total() {
    let classifier = DomainClassifier::new(vec![
        profile("products", &["diamond"], 2.0),
        profile("education", &["clarity", "carat"], 1.5),
    ]);
    // education scores 2 hits * 1.5 = 3.0 against products' 2.0.
    assert_eq!(classifier.classify("diamond clarity and carat"), "education");
}

#[test]
fn classifier_breaks_ties_toward_first_declared_domain() {
    let classifier = DomainClassifier::new(vec![
        profile("products", &["gold"], 1.0),
        profile("services", &["polish"], 1.0),
    ]);
    assert_eq!(classifier.classify("gold polish"), "products");
}

#[test]
fn classifier_returns_general_when_nothing_matches() {
    let classifier = DomainClassifier::new(default_domains());
    assert_eq!(classifier.classify("tell me a joke"), GENERAL_DOMAIN);
}

#[test]
fn default_domains_route_jewelry_phrases() {
    let classifier = DomainClassifier::new(default_domains());
    assert_eq!(classifier.classify("I want a diamond ring"), "products");
    assert_eq!(classifier.classify("can you repair my clasp"), "services");
    assert_eq!(classifier.classify("what is a lab grown stone"), "education");
}

#[test]
fn classification_is_case_insensitive() {
    let classifier = DomainClassifier::new(default_domains());
    assert_eq!(classifier.classify("DIAMOND Necklace"), "products");
}
