//! # Call-To-Action Injection
//!
//! Decides whether a model reply earns a call-to-action link and appends at
//! most one. Resolution is a three-layer precision cascade: exact trigger
//! phrases outrank semantically retrieved context, which outranks loose
//! synonym matching on the raw input. Each layer returns immediately on its
//! first hit, so a single call can never attach more than one URL.

use crate::constants::{CTA_SUFFIX, SEMANTIC_URL_SCORE};
use crate::intents::IntentCatalog;
use crate::types::ScoredPassage;
use tracing::debug;

/// Resolves zero or one call-to-action URL for a user utterance.
///
/// Layer 1 scans the high-confidence trigger-phrase table against the
/// lower-cased input. Layer 2 runs only when Layer 1 missed: passages
/// scoring strictly above [`SEMANTIC_URL_SCORE`] are scanned, in the
/// caller's confidence order, for intent synonyms. Layer 3 scans intent
/// synonyms against the raw input. All scans follow catalog declaration
/// order and the first match wins.
///
/// An empty catalog (the missing-configuration degradation) always
/// resolves to `None`.
pub fn resolve_url<'a>(
    catalog: &'a IntentCatalog,
    user_input: &str,
    semantic_results: &[ScoredPassage],
) -> Option<&'a str> {
    let input = user_input.to_lowercase();

    // Layer 1: exact trigger phrases.
    for trigger in catalog.triggers() {
        if trigger
            .phrases
            .iter()
            .any(|phrase| input.contains(phrase.as_str()))
        {
            // A trigger referencing a key outside the catalog yields no
            // match for that phrase; loaders reject that shape up front,
            // but programmatically built catalogs may still carry it.
            if let Some(record) = catalog.get(&trigger.key) {
                debug!(key = %trigger.key, "Trigger phrase match");
                return Some(&record.url);
            }
        }
    }

    // Layer 2: synonyms found in confidently retrieved passages.
    for passage in semantic_results {
        if passage.score <= SEMANTIC_URL_SCORE {
            continue;
        }
        let content = passage.content.to_lowercase();
        for record in catalog.records() {
            if record
                .synonyms
                .iter()
                .any(|synonym| content.contains(synonym.as_str()))
            {
                debug!(key = %record.key, score = passage.score, "Semantic passage match");
                return Some(&record.url);
            }
        }
    }

    // Layer 3: synonyms in the raw input.
    for record in catalog.records() {
        if record
            .synonyms
            .iter()
            .any(|synonym| input.contains(synonym.as_str()))
        {
            debug!(key = %record.key, "Synonym match");
            return Some(&record.url);
        }
    }

    debug!("No call-to-action match");
    None
}

/// Applies the resolver's decision to a model reply: appends a single
/// formatted call-to-action suffix when a URL resolves, otherwise returns
/// the reply unchanged.
pub fn annotate_reply(
    catalog: &IntentCatalog,
    user_input: &str,
    reply: &str,
    semantic_results: &[ScoredPassage],
) -> String {
    match resolve_url(catalog, user_input, semantic_results) {
        Some(url) => format!("{reply}{CTA_SUFFIX}{url}"),
        None => reply.to_string(),
    }
}
