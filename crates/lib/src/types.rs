//! Core value types shared across the retrieval pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A unit of indexed knowledge-base text.
///
/// Passages are immutable once indexed. The `metadata` map may carry a
/// source URL, a domain tag, or anything else the knowledge base provides;
/// the core never interprets it beyond round-tripping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgePassage {
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl KnowledgePassage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }
}

/// A single retrieval hit: passage content plus a cosine-style similarity
/// score in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub content: String,
    pub score: f64,
}

/// The speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One prior turn of a conversation, as threaded through the chat provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
