use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::chat::{ChatOrchestrator, ProviderList};
use crate::fallback::FallbackResponder;
use crate::llm::{Role, Turn};
use crate::result::{ChatReply, FailureClass};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<Turn>,
}

pub async fn handle_health(State(orchestrator): State<Arc<ChatOrchestrator>>) -> Json<Value> {
    let mode = if orchestrator.has_providers() { "normal" } else { "fallback" };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": orchestrator.registry().len(),
        "mode": mode,
    }))
}

pub async fn handle_providers(State(orchestrator): State<Arc<ChatOrchestrator>>) -> Json<ProviderList> {
    Json(orchestrator.provider_list())
}

pub async fn handle_provider_health(State(orchestrator): State<Arc<ChatOrchestrator>>) -> Json<Value> {
    Json(json!({ "providers": orchestrator.provider_health() }))
}

pub async fn handle_chat(
    State(orchestrator): State<Arc<ChatOrchestrator>>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ChatReply>) {
    let ChatRequest { message, history } = req;
    let supplied = history.len();
    let history: Vec<Turn> = history.into_iter().filter(|turn| turn.role != Role::System).collect();
    if history.len() != supplied {
        debug!(dropped = supplied - history.len(), "dropped client-supplied system turns");
    }

    // Adapters use the blocking HTTP client.
    let result = tokio::task::spawn_blocking(move || orchestrator.handle_chat(&message, history)).await;

    match result {
        Ok(reply) => {
            let status = match reply.failure {
                Some(FailureClass::InvalidInput) => StatusCode::BAD_REQUEST,
                _ => StatusCode::OK,
            };
            (status, Json(reply))
        }
        Err(err) => {
            error!(error = %err, "chat task failed");
            let mut reply = FallbackResponder::respond(FailureClass::Exhausted);
            reply.error = Some("internal error".to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(reply))
        }
    }
}
