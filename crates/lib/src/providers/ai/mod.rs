pub mod embedding;
pub mod gemini;
pub mod local;

use crate::errors::ProviderError;
use crate::types::ChatTurn;
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use embedding::{ApiEmbedder, Embedder};
use std::fmt::Debug;

/// A trait for interacting with a chat-completion AI provider.
///
/// This defines a common interface for generating assistant replies from
/// different backends (OpenAI-compatible endpoints, Gemini) so the service
/// can be pointed at any of them through configuration alone.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates the assistant's next reply given the persona system prompt,
    /// the prior turns of the session, and the current user input.
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        user_input: &str,
    ) -> Result<String, ProviderError>;
}

dyn_clone::clone_trait_object!(AiProvider);
