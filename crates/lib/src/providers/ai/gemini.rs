use crate::errors::ProviderError;
use crate::providers::ai::AiProvider;
use crate::types::{ChatTurn, Role};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

// --- Gemini-specific request and response structures ---

#[derive(Serialize)]
struct GeminiRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: ContentResponse,
}

#[derive(Deserialize, Debug)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize, Debug)]
struct PartResponse {
    text: String,
}

// --- Gemini Provider implementation ---

/// A provider for interacting with the Google Gemini API.
#[derive(Clone, Debug)]
pub struct GeminiProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: String,
}

impl GeminiProvider {
    /// Creates a new `GeminiProvider`.
    pub fn new(api_url: String, api_key: String) -> Result<Self, ProviderError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(ProviderError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }
}

fn turn_content(turn: &ChatTurn) -> Content {
    // Gemini names the assistant role "model".
    let role = match turn.role {
        Role::User => "user",
        Role::Assistant => "model",
    };
    Content {
        role: Some(role.to_string()),
        parts: vec![Part {
            text: turn.content.clone(),
        }],
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    /// Generates a reply, mapping the session history onto Gemini's
    /// role-tagged `contents` array and the persona onto `systemInstruction`.
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        user_input: &str,
    ) -> Result<String, ProviderError> {
        let mut contents: Vec<Content> = history.iter().map(turn_content).collect();
        contents.push(Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: user_input.to_string(),
            }],
        });

        let request_body = GeminiRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_prompt.to_string(),
                }],
            },
            contents,
        };

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", &self.api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(ProviderError::AiRequest)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::AiApi(error_text));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(ProviderError::AiDeserialization)?;

        let raw_reply = gemini_response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.clone())
            .unwrap_or_default();

        Ok(raw_reply.trim().to_string())
    }
}
