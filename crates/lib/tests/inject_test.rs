//! Tests for the three-layer URL resolution cascade and reply annotation.

use jewelrybox::constants::CTA_SUFFIX;
use jewelrybox::inject::{annotate_reply, resolve_url};
use jewelrybox::intents::{IntentCatalog, IntentRecord, TriggerPhrases};
use jewelrybox::types::ScoredPassage;

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

fn passage(content: &str, score: f64) -> ScoredPassage {
    ScoredPassage {
        content: content.to_string(),
        score,
    }
}

/// The catalog used across most tests, in declaration order.
fn catalog() -> IntentCatalog {
    let catalog = IntentCatalog::new(
        Vec::new(),
        vec![
            record(
                "browse_diamonds",
                &["diamonds", "diamond"],
                "https://x/diamonds",
            ),
            record("appointment", &["book a visit"], "https://x/appointment"),
            record(
                "financing",
                &["financing", "payment plan"],
                "https://x/financing",
            ),
        ],
        vec![trigger("appointment", &["schedule"])],
    );
    catalog.validate().expect("fixture catalog must be valid");
    catalog
}

#[test]
fn trigger_phrase_outranks_synonyms_and_passages() {
    // "schedule" is a Layer-1 trigger for appointment; "diamonds" would hit
    // Layer 3 and the high-scoring passage would hit Layer 2.
    let catalog = catalog();
    let results = vec![passage("Ask about our financing options", 0.99)];
    let url = resolve_url(&catalog, "schedule an appointment to see diamonds", &results);
    assert_eq!(url, Some("https://x/appointment"));
}

#[test]
fn trigger_with_unknown_key_is_skipped_not_fatal() {
    // Loaders reject this shape; a programmatically built catalog may still
    // carry it and must degrade to the later layers.
    let catalog = IntentCatalog::new(
        Vec::new(),
        vec![record("browse_diamonds", &["diamonds"], "https://x/diamonds")],
        vec![trigger("ghost", &["schedule"])],
    );
    let url = resolve_url(&catalog, "schedule a look at diamonds", &[]);
    assert_eq!(url, Some("https://x/diamonds"));

    let none = resolve_url(&catalog, "schedule something else", &[]);
    assert_eq!(none, None);
}

#[test]
fn passage_match_requires_score_strictly_above_bound() {
    let at_bound = vec![passage("our financing desk can help", 0.85)];
    assert_eq!(resolve_url(&catalog(), "hello there", &at_bound), None);

    let above_bound = vec![passage("our financing desk can help", 0.86)];
    assert_eq!(
        resolve_url(&catalog(), "hello there", &above_bound),
        Some("https://x/financing")
    );
}

#[test]
fn passages_are_scanned_in_caller_order() {
    // The first qualifying passage wins even when a later one matches an
    // earlier-declared intent.
    let results = vec![
        passage("flexible financing is available in store", 0.9),
        passage("loose diamonds of every cut", 0.95),
    ];
    assert_eq!(
        resolve_url(&catalog(), "hello there", &results),
        Some("https://x/financing")
    );
}

#[test]
fn synonym_fallthrough_follows_configuration_order() {
    // Both browse_diamonds and financing synonyms appear in the input;
    // browse_diamonds is declared first.
    let catalog = catalog();
    let url = resolve_url(&catalog, "diamond financing options", &[]);
    assert_eq!(url, Some("https://x/diamonds"));
}

#[test]
fn no_match_resolves_to_none() {
    assert_eq!(resolve_url(&catalog(), "tell me about opening hours", &[]), None);
}

#[test]
fn empty_catalog_never_resolves() {
    let catalog = IntentCatalog::default();
    assert_eq!(resolve_url(&catalog, "I want to see diamonds", &[]), None);
    assert_eq!(resolve_url(&catalog, "schedule an appointment", &[]), None);
}

#[test]
fn annotate_appends_the_diamonds_url() {
    let reply = "Here are some diamond options for you.";
    let annotated = annotate_reply(&catalog(), "I want to see diamonds", reply, &[]);
    assert!(annotated.ends_with("https://x/diamonds"));
    assert_eq!(
        annotated,
        format!("{reply}{CTA_SUFFIX}https://x/diamonds")
    );
}

#[test]
fn annotate_leaves_unmatched_reply_untouched() {
    let reply = "We are open Monday through Saturday.";
    let annotated = annotate_reply(&catalog(), "when are you open", reply, &[]);
    assert_eq!(annotated, reply);
}

#[test]
fn annotate_never_appends_more_than_one_suffix() {
    // Every layer would match here: trigger phrase, hot passage, synonyms.
    let results = vec![passage("financing and payment plan details", 0.99)];
    let annotated = annotate_reply(
        &catalog(),
        "schedule a diamond financing chat",
        "Happy to help.",
        &results,
    );
    assert_eq!(annotated.matches(CTA_SUFFIX).count(), 1);
}
