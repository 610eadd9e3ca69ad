use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::{handle_chat, handle_health, handle_provider_health, handle_providers};
use crate::chat::ChatOrchestrator;

pub struct ChatServer {
    pub addr: SocketAddr,
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl ChatServer {
    pub fn new(addr: SocketAddr, orchestrator: ChatOrchestrator) -> Self {
        Self {
            addr,
            orchestrator: Arc::new(orchestrator),
        }
    }

    pub fn router(&self) -> Router {
        router(self.orchestrator.clone())
    }

    pub async fn start(&self) -> Result<(), String> {
        info!(addr = %self.addr, providers = self.orchestrator.registry().len(), "chat relay listening");
        axum::Server::bind(&self.addr)
            .serve(self.router().into_make_service())
            .await
            .map_err(|err| err.to_string())
    }
}

pub fn router(orchestrator: Arc<ChatOrchestrator>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/chat", post(handle_chat))
        .route("/providers", get(handle_providers))
        .route("/providers/health", get(handle_provider_health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(orchestrator)
}
