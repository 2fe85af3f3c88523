use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jewelrybox::ProviderError;
use serde_json::json;
use tracing::error;

/// A custom error type for the server application.
///
/// Retrieval and URL-injection failures never surface here; the core
/// swallows them into empty results. What remains is provider failures on
/// the chat call itself and genuine internal errors.
pub enum AppError {
    /// Errors originating from the AI providers.
    Provider(ProviderError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::Provider(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Provider(err) => {
                error!("ProviderError: {:?}", err);
                match err {
                    ProviderError::AiRequest(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Request to AI provider failed: {e}"),
                    ),
                    ProviderError::AiDeserialization(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Failed to deserialize AI provider response: {e}"),
                    ),
                    ProviderError::AiApi(e) => {
                        (StatusCode::BAD_GATEWAY, format!("AI provider error: {e}"))
                    }
                    ProviderError::ReqwestClientBuild(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to build HTTP client: {e}"),
                    ),
                }
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred. Please try again later.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
