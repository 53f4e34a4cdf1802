//! HTTP server for the case API

use super::handler::{
    call_alert_handler, health_handler, network_handler, path_handler, ranking_handler, record_handler,
    search_handler,
};
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

fn routes() -> Router<AppState> {
    Router::new()
        .route("/records/search", get(search_handler))
        .route("/records/:name", get(record_handler))
        .route("/graph/path", get(path_handler))
        .route("/graph/all", get(network_handler))
        .route("/graph/ranking", get(ranking_handler))
        .route("/alerts/call", post(call_alert_handler))
        .route("/health", get(health_handler))
}

/// Every route at the root and again under `/api`
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .merge(routes())
        .nest("/api", routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub struct HttpServer {
    state: AppState,
    cors: CorsLayer,
    address: String,
}

impl HttpServer {
    pub fn new(state: AppState, cors: CorsLayer, address: impl Into<String>) -> Self {
        Self {
            state,
            cors,
            address: address.into(),
        }
    }

    /// Bind and serve until the listener fails
    pub async fn start(self) -> std::io::Result<()> {
        let app = router(self.state, self.cors);
        let listener = tokio::net::TcpListener::bind(&self.address).await?;

        info!("Case API listening on http://{}", listener.local_addr()?);

        axum::serve(listener, app).await
    }
}
