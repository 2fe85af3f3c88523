//! # API Route Handlers
//!
//! The Axum handlers for the chat service. Text chat and voice transcripts
//! share one post-processing pipeline (`process_reply`) so both surfaces
//! get identical retrieval and call-to-action behavior.

use crate::assets;
use crate::errors::AppError;
use crate::state::AppState;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{Html, Redirect};
use axum::Json;
use jewelrybox::inject::annotate_reply;
use jewelrybox::types::ChatTurn;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

const WIDGET_TEMPLATE: &str = include_str!("../templates/widget.html");
const VOICE_WIDGET_TEMPLATE: &str = include_str!("../templates/voice_widget.html");

// --- API Payloads ---

#[derive(Deserialize)]
pub struct ChatRequest {
    pub user_input: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub session_id: String,
    pub history: Vec<ChatTurn>,
}

#[derive(Deserialize)]
pub struct VoiceTranscriptRequest {
    pub user_input: String,
    pub ai_response: String,
}

#[derive(Serialize)]
pub struct VoiceProcessResponse {
    pub processed_response: String,
}

#[derive(Deserialize, Default)]
pub struct ClearChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

// --- Handlers ---

/// Redirects the root URL to the voice widget.
pub async fn root() -> Redirect {
    Redirect::to("/voice")
}

/// The health check handler.
pub async fn health_check() -> &'static str {
    "OK"
}

/// The main chat endpoint: generates a reply with the persona and session
/// history, then runs the shared post-processing pipeline. A request
/// without a session id gets a fresh one minted and returned.
pub async fn chat_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let session_id = payload
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    info!(%session_id, "Received chat message");

    let history = app_state.sessions.history(&session_id);
    let provider = app_state.chat_provider()?;
    let raw_reply = provider
        .generate(&app_state.system_prompt, &history, &payload.user_input)
        .await?;

    let reply = process_reply(&app_state, &payload.user_input, &raw_reply).await;

    app_state
        .sessions
        .append_exchange(&session_id, &payload.user_input, &reply);
    let history = app_state.sessions.history(&session_id);

    Ok(Json(ChatResponse {
        reply,
        session_id,
        history,
    }))
}

/// Post-processes voice transcripts through the same pipeline as text chat,
/// so spoken replies carry the same call-to-action links.
pub async fn voice_process_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<VoiceTranscriptRequest>,
) -> Result<Json<VoiceProcessResponse>, AppError> {
    let processed_response =
        process_reply(&app_state, &payload.user_input, &payload.ai_response).await;
    Ok(Json(VoiceProcessResponse { processed_response }))
}

/// Clears chat history: one session when a `session_id` is given, every
/// session otherwise.
pub async fn clear_chat_handler(
    State(app_state): State<AppState>,
    payload: Option<Json<ClearChatRequest>>,
) -> Json<Value> {
    match payload.and_then(|Json(p)| p.session_id) {
        Some(session_id) => {
            info!(%session_id, "Clearing session history");
            app_state.sessions.clear(&session_id);
        }
        None => {
            info!("Clearing all session history");
            app_state.sessions.clear_all();
        }
    }
    Json(json!({ "status": "ok", "message": "Chat history cleared." }))
}

/// Renders the text chat widget.
pub async fn widget_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Html<String> {
    let base = public_base_url(&headers);
    Html(assets::render_widget(
        WIDGET_TEMPLATE,
        &format!("{base}/chat"),
        &format!("{base}/voice/process"),
        &app_state.avatar_uri,
    ))
}

/// Renders the voice-enabled chat widget.
pub async fn voice_widget_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Html<String> {
    let base = public_base_url(&headers);
    Html(assets::render_widget(
        VOICE_WIDGET_TEMPLATE,
        &format!("{base}/chat"),
        &format!("{base}/voice/process"),
        &app_state.avatar_uri,
    ))
}

/// Shared post-processing for text and voice replies: the retrieval pass
/// plus the at-most-one-link annotation. Failures inside retrieval never
/// reach the caller; the reply simply goes out without a link.
async fn process_reply(app_state: &AppState, user_input: &str, reply: &str) -> String {
    let semantic_results = if app_state.config.retrieval.enabled {
        app_state
            .retriever
            .smart_retrieve(
                user_input,
                app_state.config.retrieval.top_k,
                app_state.config.retrieval.similarity_threshold,
            )
            .await
    } else {
        Vec::new()
    };
    annotate_reply(&app_state.catalog, user_input, reply, &semantic_results)
}

/// Reconstructs the externally visible base URL for widget-embedded links.
/// Public deployments sit behind a TLS-terminating proxy, so anything that
/// is not loopback is addressed as https unless the proxy says otherwise.
fn public_base_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_else(|| {
            if host.starts_with("127.0.0.1") || host.starts_with("localhost") {
                "http"
            } else {
                "https"
            }
        });
    format!("{scheme}://{host}")
}
