use bharti_chat::ConversationOrchestrator;
use bharti_core::{Answer, BhartiError, Language};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Shared application state.
pub struct AppState {
    pub orchestrator: Arc<ConversationOrchestrator>,
}

/// Request body for `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message text.
    pub query: String,
    /// Answer language; defaults to English.
    #[serde(default)]
    pub language: Language,
}

/// Response body for `POST /chat`: plain text for greeting/general/unknown
/// intents, a structured section list for specialised intent.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: Answer,
}

/// The main gateway server.
pub struct GatewayServer;

impl GatewayServer {
    /// Build the gateway router. CORS is permissive: the portal frontend is
    /// served from a different origin.
    pub fn build(orchestrator: Arc<ConversationOrchestrator>) -> Router {
        let state = Arc::new(AppState { orchestrator });

        Router::new()
            .route("/chat", post(chat_handler))
            .route("/clear_memory", get(clear_memory_handler))
            .route("/health", get(health_handler))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "service": "bharti"}))
}

async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    let session_id = state.orchestrator.active_session();
    info!(session_id, query_len = request.query.len(), "Chat request");

    match state
        .orchestrator
        .handle_message(session_id, &request.query, request.language)
        .await
    {
        Ok(answer) => (StatusCode::OK, Json(ChatResponse { answer })),
        Err(e @ BhartiError::NoAnswer(_)) => {
            error!(session_id, error = %e, "No answer produced");
            (
                StatusCode::NOT_FOUND,
                Json(ChatResponse {
                    answer: Answer::Text(
                        "Cannot understand the intent. Please type a proper query".to_string(),
                    ),
                }),
            )
        }
        Err(e) => {
            error!(session_id, error = %e, "Chat pipeline error");
            (
                StatusCode::NOT_FOUND,
                Json(ChatResponse {
                    answer: Answer::Text(e.to_string()),
                }),
            )
        }
    }
}

async fn clear_memory_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let new_id = state.orchestrator.clear_memory();
    info!(new_session_id = new_id, "Memory cleared");
    Json(serde_json::json!({"message": "Memory cleared successfully"}))
}
