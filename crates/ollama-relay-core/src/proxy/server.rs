use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::future::Future;
use tower_http::trace::TraceLayer;

use super::handlers::ollama;
use super::middleware::{auth_middleware, cors_layer};
use super::snapshot::SharedSnapshot;

/// Axum application state
#[derive(Clone)]
pub struct AppState {
    pub snapshot: SharedSnapshot,
}

/// Build the Ollama-compatible router around a shared configuration snapshot.
///
/// The snapshot handle is kept by the caller so it can swap in a reloaded
/// configuration while the server is running.
pub fn build_relay_router(snapshot: SharedSnapshot) -> Router<()> {
    let state = AppState { snapshot };

    // Generation and model detail routes honor the inbound API key; liveness
    // and the model list stay open for client discovery.
    let protected = Router::new()
        .route("/api/chat", post(ollama::handle_chat))
        .route("/api/generate", post(ollama::handle_generate))
        .route("/api/embeddings", post(ollama::handle_embeddings))
        .route("/api/show", post(ollama::handle_show))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(ollama::handle_root))
        .route("/api/tags", get(ollama::handle_list_models))
        .merge(protected)
        .layer(DefaultBodyLimit::max(32 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Axum server instance
pub struct RelayServer {
    addr: String,
    snapshot: SharedSnapshot,
}

impl RelayServer {
    pub fn new(addr: impl Into<String>, snapshot: SharedSnapshot) -> Self {
        Self { addr: addr.into(), snapshot }
    }

    /// Handle used to reload configuration while serving.
    pub fn snapshot(&self) -> SharedSnapshot {
        self.snapshot.clone()
    }

    /// Serve until `shutdown` resolves. In-flight requests are allowed to
    /// finish.
    pub async fn run<F>(self, shutdown: F) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        tracing::info!("Ollama relay listening on {}", listener.local_addr()?);

        let app = build_relay_router(self.snapshot);
        axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

        tracing::info!("Ollama relay stopped");
        Ok(())
    }
}
