pub mod config;
pub mod middleware;
pub mod openapi;
pub mod routes;

use axum::Router;
use cm_core::{EventIngestor, InMemoryAttemptCounter, NonceIssuer, StoredEventRepository};
use cm_db::{FileEventRepository, JsonFileStore};
use config::ServeConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub type Ingestor = EventIngestor<Arc<dyn StoredEventRepository>, InMemoryAttemptCounter>;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JsonFileStore>,
    pub ingestor: Arc<Ingestor>,
    pub nonces: NonceIssuer,
    pub response_delay: Duration,
}

impl AppState {
    /// State backed by the flat-file database named in `config`.
    pub fn new(config: &ServeConfig) -> Self {
        let store = Arc::new(JsonFileStore::new(&config.db_path));
        let repository: Arc<dyn StoredEventRepository> =
            Arc::new(FileEventRepository::new(Arc::clone(&store)));
        Self::with_repository(config, store, repository)
    }

    pub fn with_repository(
        config: &ServeConfig,
        store: Arc<JsonFileStore>,
        repository: Arc<dyn StoredEventRepository>,
    ) -> Self {
        Self {
            store,
            ingestor: Arc::new(EventIngestor::new(repository, InMemoryAttemptCounter::new())),
            nonces: NonceIssuer::new(config.nonce_ttl),
            response_delay: config.response_delay,
        }
    }
}

pub fn app(state: AppState) -> Router {
    routes::router(state)
        .layer(axum::middleware::from_fn(middleware::request_log::request_log_middleware))
        .layer(axum::middleware::from_fn(middleware::cors::cors_middleware))
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "ctrl-c handler unavailable, running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
