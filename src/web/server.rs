use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, ApiState};

/// HTTP front end for the analysis engine.
pub struct WebServer {
    host: String,
    port: u16,
}

impl WebServer {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Routes are split out so tests can drive the router without
    /// binding a socket.
    pub fn router(state: Arc<ApiState>) -> Router {
        Router::new()
            .route("/api/analyze", post(handlers::analyze))
            .route("/api/directories", get(handlers::list_directories))
            .route("/health", get(handlers::health_check))
            .with_state(state)
    }

    pub async fn start(&self) -> anyhow::Result<()> {
        let state = Arc::new(ApiState::new());
        let app = Self::router(state);

        let addr = format!("{}:{}", self.host, self.port);
        tracing::info!("starting web server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;
        Ok(())
    }
}
