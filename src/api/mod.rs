use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::index::IngestSummary;
use crate::llm::ChatTurn;
use crate::session::{Session, SessionReply};

#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<Session>>,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    kind: &'static str,
    reply: String,
}

#[derive(Serialize)]
struct ApiStatus {
    status: String,
}

/// Build the HTTP surface over one shared session. Single-user semantics:
/// concurrent requests serialize on the session lock, last write wins.
pub fn create_api(session: Session) -> Router {
    let state = AppState {
        session: Arc::new(Mutex::new(session)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/ingest", post(ingest_handler))
        .route("/chat", post(chat_handler))
        .route("/clear", post(clear_handler))
        .route("/history", get(history_handler))
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> Json<ApiStatus> {
    Json(ApiStatus {
        status: "ok".to_string(),
    })
}

async fn ingest_handler(State(state): State<AppState>) -> Response {
    let mut session = state.session.lock().await;
    match session.ingest().await {
        Ok(summary) => Json::<IngestSummary>(summary).into_response(),
        Err(e) => {
            log::error!("ingestion failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiStatus {
                    status: format!("ingestion failed: {}", e),
                }),
            )
                .into_response()
        }
    }
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let mut session = state.session.lock().await;
    let response = match session.submit(&request.message).await {
        SessionReply::Empty => ChatResponse {
            kind: "empty",
            reply: String::new(),
        },
        SessionReply::Farewell => ChatResponse {
            kind: "farewell",
            reply: "Exiting the chat. Goodbye!".to_string(),
        },
        SessionReply::Answer(answer) => ChatResponse {
            kind: "answer",
            reply: answer,
        },
        SessionReply::Failure(message) => ChatResponse {
            kind: "error",
            reply: message,
        },
    };
    Json(response)
}

async fn clear_handler(State(state): State<AppState>) -> Json<ApiStatus> {
    let mut session = state.session.lock().await;
    session.clear();
    Json(ApiStatus {
        status: "ok".to_string(),
    })
}

async fn history_handler(State(state): State<AppState>) -> Json<Vec<ChatTurn>> {
    let session = state.session.lock().await;
    Json(session.history().to_vec())
}
