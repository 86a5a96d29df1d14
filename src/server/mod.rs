//! HTTP surface: a single `POST /api/analyze` endpoint taking a multipart upload.

mod handlers;

pub use handlers::analyze;

use crate::config::Config;
use crate::llm::{ConfiguredLlms, LlmFactory};
use crate::orchestrator::Orchestrator;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(config: Arc<Config>, llms: Arc<dyn LlmFactory>) -> Self {
        AppState {
            orchestrator: Arc::new(Orchestrator::new(config, llms)),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.orchestrator.config().get_max_upload_bytes();
    Router::new()
        .route("/api/analyze", post(handlers::analyze))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Start the web server.
pub async fn serve(
    config: Arc<Config>,
    host: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let llms = Arc::new(ConfiguredLlms::new(Arc::clone(&config)));
    let app = create_router(AppState::new(config, llms));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
