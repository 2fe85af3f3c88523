//! # Embeddings Provider
//!
//! Vector embeddings come from an external, OpenAI-compatible embeddings
//! API. The [`Embedder`] trait is the seam the retriever and the index
//! builder depend on, so deterministic implementations can stand in during
//! tests. Embedding is deterministic for a fixed input and model, which is
//! what keeps retrieval idempotent.

use crate::errors::ProviderError;
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Produces fixed-dimension embedding vectors for text.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, input: &str) -> Result<Vec<f32>, ProviderError>;
}

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize, Debug)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize, Debug)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize, Debug)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// An [`Embedder`] backed by an OpenAI-compatible embeddings endpoint.
#[derive(Clone, Debug)]
pub struct ApiEmbedder {
    client: ReqwestClient,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl ApiEmbedder {
    /// Creates a new `ApiEmbedder`.
    pub fn new(
        api_url: String,
        model: String,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(ProviderError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            model,
            api_key,
        })
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    async fn embed(&self, input: &str) -> Result<Vec<f32>, ProviderError> {
        let request_body = EmbeddingRequest {
            model: &self.model,
            input,
        };
        debug!(model = %self.model, "--> Sending request to embeddings API");

        let mut request_builder = self.client.post(&self.api_url).json(&request_body);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        let response = request_builder
            .send()
            .await
            .map_err(ProviderError::AiRequest)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::AiApi(error_text));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(ProviderError::AiDeserialization)?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::AiApi("embeddings API returned no vectors".to_string()))
    }
}
