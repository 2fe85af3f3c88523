//! # JewelryBox Retrieval Core
//!
//! This crate provides the decision-making core of the JewelryBox assistant:
//! classifying a user utterance into a coarse domain, retrieving semantically
//! similar knowledge-base passages from the vector index scoped to that
//! domain (with a broader fallback pass when the primary search comes back
//! under-confident), and deciding, under a strict at-most-one-link policy,
//! whether a call-to-action URL is appended to the model's reply.
//!
//! The enclosing HTTP service, the chat-model call itself, and text-to-speech
//! live outside this crate; the core is invoked as a library.

pub mod classifier;
pub mod constants;
pub mod errors;
pub mod index;
pub mod inject;
pub mod intents;
pub mod prompts;
pub mod providers;
pub mod search;
pub mod types;

pub use errors::ProviderError;
pub use inject::{annotate_reply, resolve_url};
pub use intents::{IntentCatalog, IntentConfigError, IntentRecord};
pub use search::{IndexRouter, Retrieve, SmartRetriever, VectorRetriever};
pub use types::{ChatTurn, KnowledgePassage, ScoredPassage};
